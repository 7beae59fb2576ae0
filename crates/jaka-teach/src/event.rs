//! 事件定义
//!
//! 后台线程（轮询、回放）通过 crossbeam 通道把结果送回控制线程。
//! 控制线程持有 [`EventReceiver`]，按需 `try_recv` / `recv_timeout`。

use crate::player::PlaybackSummary;
use crossbeam_channel::{Receiver, Sender};
use jaka_actuator::SessionState;
use jaka_types::{Deg, JointArray};
use std::fmt;

/// 位姿同步事件
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// 最新关节位置（度）
    Pose(JointArray<Deg>),
}

/// 回放结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// 所有循环执行完毕
    Completed,
    /// 被停止
    Stopped,
}

impl fmt::Display for PlaybackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackOutcome::Completed => f.write_str("completed"),
            PlaybackOutcome::Stopped => f.write_str("stopped"),
        }
    }
}

/// 回放进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// 开始回放
    Started {
        /// 点位数
        points: usize,
        /// 目标循环次数（`None` 表示无限）
        loops: Option<u32>,
    },
    /// 开始移动到某个点位
    PointStarted {
        /// 循环序号（从 0 开始）
        loop_index: u32,
        /// 点位序号（从 0 开始）
        index: usize,
        /// 点位名称
        name: String,
    },
    /// 点位移动成功
    PointCompleted {
        loop_index: u32,
        index: usize,
        name: String,
    },
    /// 点位移动失败（回放继续）
    PointFailed {
        loop_index: u32,
        index: usize,
        name: String,
        /// 错误描述
        error: String,
    },
    /// 完成一轮
    LoopCompleted {
        /// 已完成的轮数
        loops_completed: u32,
    },
    /// 已暂停
    Paused,
    /// 已恢复
    Resumed,
    /// 回放结束
    Finished(PlaybackSummary),
}

/// 示教站事件
#[derive(Debug, Clone, PartialEq)]
pub enum TeachEvent {
    /// 位姿同步
    Sync(SyncEvent),
    /// 回放进度
    Playback(PlaybackEvent),
    /// 会话状态变化
    Session(SessionState),
}

impl From<SyncEvent> for TeachEvent {
    fn from(event: SyncEvent) -> Self {
        TeachEvent::Sync(event)
    }
}

impl From<PlaybackEvent> for TeachEvent {
    fn from(event: PlaybackEvent) -> Self {
        TeachEvent::Playback(event)
    }
}

/// 事件接收端
pub type EventReceiver = Receiver<TeachEvent>;

/// 事件发送端
///
/// 接收端被丢弃后发送静默失败，后台线程不受影响。
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<Sender<TeachEvent>>,
}

impl EventSink {
    /// 创建无界通道
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    /// 丢弃所有事件
    pub fn discard() -> Self {
        Self { tx: None }
    }

    /// 发送事件
    pub fn emit(&self, event: impl Into<TeachEvent>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event.into());
        }
    }
}

impl From<Sender<TeachEvent>> for EventSink {
    fn from(tx: Sender<TeachEvent>) -> Self {
        Self { tx: Some(tx) }
    }
}
