//! play 命令
//!
//! 在模拟执行器上回放点位文件，Ctrl-C 在下一个点位边界停止

use super::config::load_config;
use super::points::{limit_violations, load_points_file};
use crate::utils::{confirm, describe_event, simulated_actuator};
use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::RecvTimeoutError;
use jaka_teach::{
    EventReceiver, LoopTarget, PlaybackEvent, PlaybackOutcome, PlaybackState, PlaybackSummary,
    TeachEvent, TeachStation,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::spawn_blocking;

/// 模拟控制器地址
const SIM_ADDRESS: &str = "sim";

/// 回放命令参数
#[derive(Args, Debug)]
pub struct PlayCommand {
    /// 点位文件路径
    pub file: PathBuf,

    /// 循环次数（默认 1）
    #[arg(short, long, conflicts_with = "infinite")]
    pub loops: Option<u32>,

    /// 无限循环，直到 Ctrl-C
    #[arg(long)]
    pub infinite: bool,

    /// 速度百分比（5-100，覆盖配置）
    #[arg(short, long)]
    pub speed: Option<f64>,

    /// 跳过确认
    #[arg(short, long)]
    pub yes: bool,
}

impl PlayCommand {
    /// 循环目标
    pub fn loop_target(&self) -> LoopTarget {
        if self.infinite {
            LoopTarget::Infinite
        } else {
            LoopTarget::Count(self.loops.unwrap_or(1))
        }
    }

    /// 执行回放
    pub async fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;

        // === 1. 文件检查 ===

        let points = load_points_file(&self.file)?;
        let violations = limit_violations(&points);
        let target = self.loop_target();

        // === 2. 显示回放信息 ===

        println!("════════════════════════════════════════");
        println!("           回放模式（模拟执行器）");
        println!("════════════════════════════════════════");
        println!();
        println!("📁 文件: {} ({} 个点位)", self.file.display(), points.len());
        println!("🔁 循环: {}", target);
        if let Some(speed) = self.speed {
            println!("⚡ 速度: {:.2}%", speed);
        } else {
            println!("⚡ 速度: {} (配置)", config.speed());
        }
        for (index, error) in &violations {
            println!("⚠️  #{} [{}]: {}", index + 1, points[*index].name(), error);
        }
        println!();

        // === 3. 确认 ===

        if !self.yes {
            if !confirm("即将开始回放，确定要继续吗？")? {
                println!("❌ 操作已取消");
                return Ok(());
            }
            println!("✅ 已确认");
            println!();
        }

        // === 4. 准备示教站 ===

        let (station, events) =
            TeachStation::new(simulated_actuator(), config).context("配置无效")?;
        let station = Arc::new(station);

        station.connect(SIM_ADDRESS)?;
        station.power_on()?;
        station.enable()?;
        station
            .load_points(&self.file)
            .with_context(|| format!("加载点位失败: {}", self.file.display()))?;
        if let Some(speed) = self.speed {
            station.set_speed(speed);
        }

        station.run(target).context("启动回放失败")?;

        // === 5. Ctrl-C：在下一个点位边界停止 ===

        let stopper = station.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!();
                println!("🛑 收到停止信号，将在当前点位结束后停止...");
                stopper.stop();
            }
        });

        println!("💡 提示: 按 Ctrl-C 可随时停止回放");
        println!();

        // === 6. 使用 spawn_blocking 隔离阻塞等待 ===

        let watcher = station.clone();
        let summary = spawn_blocking(move || follow_playback(&watcher, &events))
            .await
            .map_err(|e| anyhow::anyhow!("任务执行失败: {}", e))?;
        ctrl_c.abort();

        if let Err(e) = station.shutdown() {
            tracing::warn!("Shutdown after playback failed: {}", e);
        }

        match summary {
            Some(summary) => {
                println!();
                println!(
                    "✅ 回放{}: {} 轮, 成功 {} 次, 失败 {} 次",
                    if summary.outcome == PlaybackOutcome::Completed {
                        "完成"
                    } else {
                        "已停止"
                    },
                    summary.loops_completed,
                    summary.moves_ok,
                    summary.moves_failed
                );
                Ok(())
            },
            None => anyhow::bail!("回放线程异常退出"),
        }
    }
}

/// 打印事件直到回放结束，返回统计
fn follow_playback(station: &TeachStation, events: &EventReceiver) -> Option<PlaybackSummary> {
    loop {
        match events.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => {
                if let Some(text) = describe_event(&event) {
                    println!("{}", text);
                }
                if let TeachEvent::Playback(PlaybackEvent::Finished(summary)) = event {
                    return station.wait().or(Some(summary));
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                if station.playback_state() == PlaybackState::Idle && events.is_empty() {
                    return station.wait();
                }
            },
            Err(RecvTimeoutError::Disconnected) => return station.wait(),
        }
    }
}
