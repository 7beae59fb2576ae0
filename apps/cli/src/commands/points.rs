//! points 命令
//!
//! 查看和检查点位文件

use crate::utils::print_points;
use crate::validation::PathValidator;
use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use jaka_teach::TaughtPoint;
use jaka_teach::store::read_file;
use jaka_types::{Deg, JAKA_JOINT_LIMITS, JOINT_COUNT, ValidationError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// 表格
    #[default]
    Table,
    /// JSON
    Json,
}

/// 点位文件命令
#[derive(Subcommand, Debug)]
pub enum PointsCommand {
    /// 显示点位
    Show {
        /// 点位文件路径
        file: PathBuf,

        /// 输出格式
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 检查文件格式和关节限位
    Check {
        /// 点位文件路径
        file: PathBuf,
    },
}

/// JSON 输出的点位视图
#[derive(Debug, Serialize)]
struct PointView<'a> {
    index: usize,
    name: &'a str,
    delay_secs: f64,
    joints_deg: [Deg; JOINT_COUNT],
}

impl<'a> PointView<'a> {
    fn new(index: usize, point: &'a TaughtPoint) -> Self {
        Self {
            index,
            name: point.name(),
            delay_secs: point.delay_secs(),
            joints_deg: point.pose().to_degrees().into_array(),
        }
    }
}

/// 读取点位文件
pub fn load_points_file(path: &Path) -> Result<Vec<TaughtPoint>> {
    PathValidator::new().must_exist().validate_path(path)?;
    read_file(path).with_context(|| format!("读取点位文件失败: {}", path.display()))
}

/// 找出超出限位的点位（序号，错误）
pub fn limit_violations(points: &[TaughtPoint]) -> Vec<(usize, ValidationError)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            JAKA_JOINT_LIMITS
                .validate_pose(&point.pose().to_degrees())
                .err()
                .map(|e| (i, e))
        })
        .collect()
}

/// 点位列表的 JSON 表示
fn points_json(points: &[TaughtPoint]) -> Result<String> {
    let views: Vec<PointView<'_>> = points
        .iter()
        .enumerate()
        .map(|(i, p)| PointView::new(i, p))
        .collect();
    serde_json::to_string_pretty(&views).context("序列化点位失败")
}

impl PointsCommand {
    pub fn execute(&self) -> Result<()> {
        match self {
            PointsCommand::Show { file, format } => Self::show_(file, *format),

            PointsCommand::Check { file } => Self::check_(file),
        }
    }

    fn show_(file: &Path, format: OutputFormat) -> Result<()> {
        let points = load_points_file(file)?;

        match format {
            OutputFormat::Table => {
                println!("📁 {} ({} 个点位)", file.display(), points.len());
                print_points(&points);
            },
            OutputFormat::Json => println!("{}", points_json(&points)?),
        }

        Ok(())
    }

    fn check_(file: &Path) -> Result<()> {
        let points = load_points_file(file)?;
        let violations = limit_violations(&points);

        for (index, error) in &violations {
            println!("❌ #{} [{}]: {}", index + 1, points[*index].name(), error);
        }

        if !violations.is_empty() {
            anyhow::bail!("{} 个点位超出关节限位", violations.len());
        }

        println!("✅ {}: {} 个点位，全部在限位内", file.display(), points.len());
        Ok(())
    }
}
