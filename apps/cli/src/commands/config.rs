//! 配置管理命令
//!
//! 配置文件为 TOML，默认位于平台配置目录下的 `jaka/teach.toml`，
//! 可用全局参数 `--config` 覆盖。

use anyhow::{Context, Result};
use clap::Subcommand;
use jaka_teach::TeachConfig;
use std::path::{Path, PathBuf};

/// 默认配置目录
fn config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("jaka");
    Ok(path)
}

/// 配置文件路径（显式路径优先）
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let mut path = config_dir()?;
    path.push("teach.toml");
    Ok(path)
}

/// 加载配置（文件不存在时使用默认值）
pub fn load_config(explicit: Option<&Path>) -> Result<TeachConfig> {
    let path = config_file(explicit)?;
    TeachConfig::load_or_default(&path)
        .with_context(|| format!("加载配置失败: {}", path.display()))
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示当前生效的配置
    Show,

    /// 写入默认配置
    Init {
        /// 覆盖已存在的配置文件
        #[arg(short, long)]
        force: bool,
    },

    /// 显示配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, explicit: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show_(explicit),

            ConfigCommand::Init { force } => Self::init_(explicit, force),

            ConfigCommand::Path => Self::path_(explicit),
        }
    }

    fn show_(explicit: Option<&Path>) -> Result<()> {
        let path = config_file(explicit)?;
        let config = load_config(explicit)?;

        if path.exists() {
            println!("# {}", path.display());
        } else {
            println!("# {} (不存在，显示默认值)", path.display());
        }
        print!("{}", config.to_toml_string().context("序列化配置失败")?);

        Ok(())
    }

    fn init_(explicit: Option<&Path>, force: bool) -> Result<()> {
        let path = config_file(explicit)?;

        if path.exists() && !force {
            anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }

        TeachConfig::default()
            .save_to_file(&path)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;

        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }

    fn path_(explicit: Option<&Path>) -> Result<()> {
        let path = config_file(explicit)?;
        println!("{}", path.display());
        Ok(())
    }
}
