//! 用户交互工具
//!
//! 确认提示、点位列表和事件的终端输出

use anyhow::Result;
use jaka_actuator::SimulatedActuator;
use jaka_teach::{PlaybackEvent, SyncEvent, TaughtPoint, TeachEvent};
use std::sync::Arc;
use std::time::Duration;

/// 模拟执行器的单次阻塞移动耗时
const SIM_MOVE_DURATION: Duration = Duration::from_millis(50);

/// 创建 CLI 使用的模拟执行器
pub fn simulated_actuator() -> Arc<SimulatedActuator> {
    Arc::new(SimulatedActuator::new().with_move_duration(SIM_MOVE_DURATION))
}

/// 确认提示（默认为 No）
pub fn confirm(prompt: &str) -> Result<bool> {
    inquire::Confirm::new(prompt)
        .with_default(false)
        .prompt()
        .map_err(|e| anyhow::anyhow!("用户交互失败: {}", e))
}

/// 打印点位列表
pub fn print_points(points: &[TaughtPoint]) {
    if points.is_empty() {
        println!("  (无点位)");
        return;
    }
    for (i, point) in points.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, point);
    }
}

/// 事件的单行描述
///
/// 位姿同步事件过于频繁，返回 `None`。
pub fn describe_event(event: &TeachEvent) -> Option<String> {
    match event {
        TeachEvent::Sync(SyncEvent::Pose(_)) => None,
        TeachEvent::Session(state) => Some(format!("🔌 会话状态: {}", state)),
        TeachEvent::Playback(event) => Some(describe_playback(event)),
    }
}

fn describe_playback(event: &PlaybackEvent) -> String {
    match event {
        PlaybackEvent::Started { points, loops } => match loops {
            Some(n) => format!("▶️  开始回放: {} 个点位 × {} 轮", points, n),
            None => format!("▶️  开始回放: {} 个点位 × ∞", points),
        },
        PlaybackEvent::PointStarted {
            loop_index,
            index,
            name,
        } => format!("⏳ [第 {} 轮] #{} {}", loop_index + 1, index + 1, name),
        PlaybackEvent::PointCompleted { index, name, .. } => {
            format!("✅ #{} {} 到位", index + 1, name)
        },
        PlaybackEvent::PointFailed {
            index, name, error, ..
        } => format!("⚠️  #{} {} 失败: {}", index + 1, name, error),
        PlaybackEvent::LoopCompleted { loops_completed } => {
            format!("🔁 完成第 {} 轮", loops_completed)
        },
        PlaybackEvent::Paused => "⏸️  已暂停".to_string(),
        PlaybackEvent::Resumed => "▶️  已恢复".to_string(),
        PlaybackEvent::Finished(summary) => format!(
            "🏁 回放结束 ({}): {} 轮, 成功 {} 次, 失败 {} 次",
            summary.outcome, summary.loops_completed, summary.moves_ok, summary.moves_failed
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaka_actuator::SessionState;
    use jaka_teach::{PlaybackOutcome, PlaybackSummary};
    use jaka_types::{Deg, JointArray};

    #[test]
    fn test_sync_events_are_quiet() {
        let event = TeachEvent::Sync(SyncEvent::Pose(JointArray::splat(Deg(0.0))));
        assert!(describe_event(&event).is_none());
    }

    #[test]
    fn test_describe_events() {
        let text = describe_event(&TeachEvent::Session(SessionState::Enabled)).unwrap();
        assert!(text.contains(&SessionState::Enabled.to_string()));

        let summary = PlaybackSummary {
            outcome: PlaybackOutcome::Stopped,
            loops_completed: 2,
            moves_ok: 3,
            moves_failed: 1,
        };
        let text = describe_event(&TeachEvent::Playback(PlaybackEvent::Finished(summary))).unwrap();
        assert!(text.contains("stopped"));
        assert!(text.contains("失败 1 次"));

        let text = describe_event(&TeachEvent::Playback(PlaybackEvent::Started {
            points: 2,
            loops: None,
        }))
        .unwrap();
        assert!(text.contains("∞"));
    }
}
