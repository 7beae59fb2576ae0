//! # JAKA CLI
//!
//! Command-line interface for the JAKA teach-and-playback sequencer.
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于 CI/脚本）
//!
//! ```bash
//! # 生成默认配置
//! jaka-cli config init
//!
//! # 校验关节角度
//! jaka-cli check --joints 0,90,-45,90,0,0
//!
//! # 在模拟执行器上回放点位文件
//! jaka-cli play points.txt --loops 3 --speed 50
//! ```
//!
//! ### REPL 模式（推荐用于示教）
//!
//! ```bash
//! $ jaka-cli shell
//! jaka> connect 10.5.5.100
//! jaka> power-on
//! jaka> enable
//! jaka> jog 2 45
//! jaka> record Pick 0.5
//! jaka> run 3
//! jaka> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod modes;
mod utils;
mod validation;

use commands::{CheckCommand, ConfigCommand, PlayCommand, PointsCommand};
use modes::repl::run_repl;

/// 默认日志过滤
const DEFAULT_LOG_FILTER: &str = "jaka_cli=info,jaka_teach=info";

/// JAKA CLI - 示教回放命令行工具
#[derive(Parser, Debug)]
#[command(name = "jaka-cli")]
#[command(about = "Teach-and-playback console for JAKA six-axis arms", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认：平台配置目录下的 jaka/teach.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 校验关节角度是否在限位内
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 点位文件工具
    #[command(subcommand)]
    Points(PointsCommand),

    /// 在模拟执行器上回放点位文件
    Play {
        #[command(flatten)]
        args: PlayCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（RUST_LOG 优先）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(config_path),

        Commands::Check { args } => args.execute(),

        Commands::Points(cmd) => cmd.execute(),

        Commands::Play { args } => args.execute(config_path).await,

        Commands::Shell => {
            let config = commands::config::load_config(config_path)?;
            run_repl(config).await
        },
    }
}
