//! 序列回放
//!
//! # 状态机
//!
//! ```text
//!          start                pause
//!   Idle ─────────▶ Running ◀──────────▶ Paused
//!    ▲                 │        resume      │
//!    └── 完成 / stop ──┴────────────────────┘
//! ```
//!
//! - 回放在独立线程中运行，控制线程通过原子标志暂停 / 恢复 / 停止
//! - 每个点位：暂停时每隔 `pause_poll` 检查一次；阻塞式绝对移动；
//!   成功或失败都会执行点位延时；然后检查停止标志
//! - 单个点位失败只记录，不中断回放
//! - 停止在下一个点位边界生效（不打断正在进行的移动），暂停中的停止会立即释放等待
//! - 每次移动前读取 [`SharedSpeed`]，回放中调整速度会在下一个点位生效

use crate::config::PlaybackConfig;
use crate::error::PlaybackError;
use crate::event::{EventSink, PlaybackEvent, PlaybackOutcome};
use crate::store::TaughtPoint;
use jaka_actuator::{ActuatorSession, MoveMode};
use jaka_types::SharedSpeed;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 延时等待的检查粒度
const DELAY_SLICE: Duration = Duration::from_millis(20);

/// 回放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PlaybackState {
    /// 空闲（默认）
    #[default]
    Idle = 0,
    /// 运行中
    Running = 1,
    /// 已暂停
    Paused = 2,
}

impl PlaybackState {
    /// 从 u8 转换
    ///
    /// 无效值视为 Idle。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Paused,
            _ => Self::Idle,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => f.write_str("idle"),
            PlaybackState::Running => f.write_str("running"),
            PlaybackState::Paused => f.write_str("paused"),
        }
    }
}

/// 回放状态（原子版本，用于线程间共享）
#[derive(Debug, Default)]
pub struct AtomicPlaybackState {
    inner: AtomicU8,
}

impl AtomicPlaybackState {
    /// 创建新的原子状态
    pub fn new(state: PlaybackState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self) -> PlaybackState {
        PlaybackState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 设置状态
    pub fn set(&self, state: PlaybackState) {
        self.inner.store(state.as_u8(), Ordering::Release);
    }

    /// 比较并交换，成功返回 `true`
    pub fn transition(&self, from: PlaybackState, to: PlaybackState) -> bool {
        self.inner
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// 循环次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTarget {
    /// 固定次数（至少 1 次）
    Count(u32),
    /// 无限循环，直到停止
    Infinite,
}

impl LoopTarget {
    /// 固定次数（`Infinite` 时为 `None`）
    pub fn count(self) -> Option<u32> {
        match self {
            LoopTarget::Count(n) => Some(n),
            LoopTarget::Infinite => None,
        }
    }

    fn is_done(self, loops_completed: u32) -> bool {
        matches!(self, LoopTarget::Count(n) if loops_completed >= n)
    }
}

impl Default for LoopTarget {
    fn default() -> Self {
        LoopTarget::Count(1)
    }
}

impl fmt::Display for LoopTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopTarget::Count(n) => write!(f, "{n}"),
            LoopTarget::Infinite => f.write_str("∞"),
        }
    }
}

/// 回放状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRunState {
    /// 当前状态
    pub state: PlaybackState,
    /// 已完成的轮数
    pub loop_index: u32,
    /// 目标轮数（空闲且从未启动时为 `None`）
    pub loop_target: Option<LoopTarget>,
}

impl SequenceRunState {
    /// 是否在运行（含暂停）
    pub fn running(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    /// 是否暂停
    pub fn paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }
}

/// 回放结果统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// 结束原因
    pub outcome: PlaybackOutcome,
    /// 完成的轮数
    pub loops_completed: u32,
    /// 成功的移动数
    pub moves_ok: u32,
    /// 失败的移动数
    pub moves_failed: u32,
}

#[derive(Debug, Default)]
struct Shared {
    state: AtomicPlaybackState,
    stop: AtomicBool,
    loop_index: AtomicU32,
    target: Mutex<Option<LoopTarget>>,
}

impl Shared {
    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// 线程异常退出时恢复为 Idle
struct IdleOnPanic {
    shared: Arc<Shared>,
    armed: bool,
}

impl Drop for IdleOnPanic {
    fn drop(&mut self) {
        if self.armed {
            self.shared.state.set(PlaybackState::Idle);
        }
    }
}

/// 序列回放器
pub struct SequencePlayer {
    session: Arc<ActuatorSession>,
    speed: Arc<SharedSpeed>,
    config: PlaybackConfig,
    events: EventSink,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<PlaybackSummary>>>,
}

impl SequencePlayer {
    /// 创建回放器
    pub fn new(
        session: Arc<ActuatorSession>,
        speed: Arc<SharedSpeed>,
        config: PlaybackConfig,
        events: EventSink,
    ) -> Self {
        Self {
            session,
            speed,
            config,
            events,
            shared: Arc::new(Shared::default()),
            worker: Mutex::new(None),
        }
    }

    /// 当前状态
    pub fn state(&self) -> PlaybackState {
        self.shared.state.get()
    }

    /// 状态快照
    pub fn snapshot(&self) -> SequenceRunState {
        SequenceRunState {
            state: self.shared.state.get(),
            loop_index: self.shared.loop_index.load(Ordering::Acquire),
            loop_target: *self.shared.target.lock(),
        }
    }

    /// 开始回放
    ///
    /// `points` 是点位的快照，回放期间修改存储不影响本次回放。
    ///
    /// # 错误
    ///
    /// - [`PlaybackError::AlreadyRunning`]：已有序列在运行
    /// - [`PlaybackError::InvalidLoopCount`]：循环次数为 0
    /// - [`PlaybackError::NoPoints`]：点位为空
    /// - [`PlaybackError::NotReady`]：执行器未使能
    pub fn start(&self, points: Vec<TaughtPoint>, target: LoopTarget) -> Result<(), PlaybackError> {
        self.start_holding(points, target, ())
    }

    /// 开始回放，并在回放线程存活期间持有 `hold`
    ///
    /// `hold` 在回放结束（进入 Idle 之前）被释放，用于挂起守卫等资源。
    pub fn start_holding<H: Send + 'static>(
        &self,
        points: Vec<TaughtPoint>,
        target: LoopTarget,
        hold: H,
    ) -> Result<(), PlaybackError> {
        let mut worker = self.worker.lock();
        if self.state() != PlaybackState::Idle {
            return Err(PlaybackError::AlreadyRunning);
        }
        if target == LoopTarget::Count(0) {
            return Err(PlaybackError::InvalidLoopCount(0));
        }
        if points.is_empty() {
            return Err(PlaybackError::NoPoints);
        }
        if !self.session.is_ready() {
            return Err(PlaybackError::NotReady);
        }

        // 上一次回放已进入 Idle，回收其线程
        if let Some(previous) = worker.take() {
            let _ = previous.join();
        }

        self.shared.stop.store(false, Ordering::Release);
        self.shared.loop_index.store(0, Ordering::Release);
        *self.shared.target.lock() = Some(target);
        self.shared.state.set(PlaybackState::Running);

        let run = PlaybackRun {
            session: self.session.clone(),
            speed: self.speed.clone(),
            pause_poll: self.config.pause_poll(),
            events: self.events.clone(),
            shared: self.shared.clone(),
            points,
            target,
        };

        let spawned = thread::Builder::new()
            .name("jaka-playback".to_string())
            .spawn(move || {
                let mut guard = IdleOnPanic {
                    shared: run.shared.clone(),
                    armed: true,
                };
                let summary = run.execute(hold);
                guard.armed = false;
                summary
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            },
            Err(e) => {
                self.shared.state.set(PlaybackState::Idle);
                Err(PlaybackError::Spawn(e))
            },
        }
    }

    /// 暂停（仅在运行中有效）
    pub fn pause(&self) -> bool {
        let changed = self
            .shared
            .state
            .transition(PlaybackState::Running, PlaybackState::Paused);
        if changed {
            info!("Sequence paused");
            self.events.emit(PlaybackEvent::Paused);
        }
        changed
    }

    /// 恢复（仅在暂停中有效）
    pub fn resume(&self) -> bool {
        let changed = self
            .shared
            .state
            .transition(PlaybackState::Paused, PlaybackState::Running);
        if changed {
            info!("Sequence resumed");
            self.events.emit(PlaybackEvent::Resumed);
        }
        changed
    }

    /// 请求停止
    ///
    /// 回放线程在下一个点位边界退出；不等待退出，需要时调用 [`wait`](Self::wait)。
    pub fn stop(&self) -> bool {
        if self.state() == PlaybackState::Idle {
            return false;
        }
        self.shared.stop.store(true, Ordering::Release);
        info!("Sequence stop requested");
        true
    }

    /// 等待回放线程结束并返回统计
    ///
    /// 没有回放线程时返回 `None`。
    pub fn wait(&self) -> Option<PlaybackSummary> {
        let handle = self.worker.lock().take()?;
        match handle.join() {
            Ok(summary) => Some(summary),
            Err(_) => {
                error!("Playback worker panicked");
                None
            },
        }
    }
}

impl Drop for SequencePlayer {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.worker.get_mut().take() {
            let _ = handle.join();
        }
    }
}

/// 一次回放的全部上下文（移动到回放线程）
struct PlaybackRun {
    session: Arc<ActuatorSession>,
    speed: Arc<SharedSpeed>,
    pause_poll: Duration,
    events: EventSink,
    shared: Arc<Shared>,
    points: Vec<TaughtPoint>,
    target: LoopTarget,
}

impl PlaybackRun {
    fn execute<H>(self, hold: H) -> PlaybackSummary {
        info!(
            "Sequence started: {} points x {} loops",
            self.points.len(),
            self.target
        );
        self.events.emit(PlaybackEvent::Started {
            points: self.points.len(),
            loops: self.target.count(),
        });

        let mut moves_ok = 0u32;
        let mut moves_failed = 0u32;
        let mut loops_completed = 0u32;

        'sequence: loop {
            for (index, point) in self.points.iter().enumerate() {
                if !self.wait_while_paused() {
                    break 'sequence;
                }

                self.events.emit(PlaybackEvent::PointStarted {
                    loop_index: loops_completed,
                    index,
                    name: point.name().to_string(),
                });

                let result = self.session.actuator().move_joint(
                    point.pose(),
                    MoveMode::Absolute,
                    true,
                    self.speed.ratio(),
                );
                match result {
                    Ok(()) => {
                        moves_ok = moves_ok.saturating_add(1);
                        info!("Moved to '{}'", point.name());
                        self.events.emit(PlaybackEvent::PointCompleted {
                            loop_index: loops_completed,
                            index,
                            name: point.name().to_string(),
                        });
                    },
                    Err(e) => {
                        moves_failed = moves_failed.saturating_add(1);
                        warn!("Move to '{}' failed: {}", point.name(), e);
                        self.events.emit(PlaybackEvent::PointFailed {
                            loop_index: loops_completed,
                            index,
                            name: point.name().to_string(),
                            error: e.to_string(),
                        });
                    },
                }

                if point.delay_secs() > 0.0 {
                    self.sleep_unless_stopped(point.delay());
                }
                if self.shared.stop_requested() {
                    break 'sequence;
                }
            }

            // 无限循环时计数停在 u32::MAX
            loops_completed = loops_completed.saturating_add(1);
            self.shared.loop_index.store(loops_completed, Ordering::Release);
            self.events
                .emit(PlaybackEvent::LoopCompleted { loops_completed });

            if self.target.is_done(loops_completed) || self.shared.stop_requested() {
                break;
            }
        }

        let outcome = if self.shared.stop_requested() {
            PlaybackOutcome::Stopped
        } else {
            PlaybackOutcome::Completed
        };
        let summary = PlaybackSummary {
            outcome,
            loops_completed,
            moves_ok,
            moves_failed,
        };

        drop(hold);
        self.shared.state.set(PlaybackState::Idle);
        info!(
            "Sequence {}: {} loops, {} moves ok, {} failed",
            outcome, loops_completed, moves_ok, moves_failed
        );
        self.events.emit(PlaybackEvent::Finished(summary));
        summary
    }

    /// 暂停时等待，返回 `false` 表示收到停止请求
    fn wait_while_paused(&self) -> bool {
        while self.shared.state.get() == PlaybackState::Paused {
            if self.shared.stop_requested() {
                return false;
            }
            thread::sleep(self.pause_poll);
        }
        !self.shared.stop_requested()
    }

    /// 分片休眠，收到停止请求后提前返回
    fn sleep_unless_stopped(&self, duration: Duration) {
        let started = Instant::now();
        loop {
            if self.shared.stop_requested() {
                return;
            }
            let elapsed = started.elapsed();
            if elapsed >= duration {
                return;
            }
            thread::sleep((duration - elapsed).min(DELAY_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_u8() {
        assert_eq!(PlaybackState::from_u8(1), PlaybackState::Running);
        assert_eq!(PlaybackState::from_u8(2), PlaybackState::Paused);
        assert_eq!(PlaybackState::from_u8(9), PlaybackState::Idle);
    }

    #[test]
    fn test_atomic_transition() {
        let state = AtomicPlaybackState::default();
        assert!(!state.transition(PlaybackState::Running, PlaybackState::Paused));
        state.set(PlaybackState::Running);
        assert!(state.transition(PlaybackState::Running, PlaybackState::Paused));
        assert_eq!(state.get(), PlaybackState::Paused);
    }

    #[test]
    fn test_loop_target() {
        assert!(LoopTarget::Count(3).is_done(3));
        assert!(!LoopTarget::Count(3).is_done(2));
        assert!(!LoopTarget::Infinite.is_done(u32::MAX));
        assert!(LoopTarget::Count(u32::MAX).is_done(u32::MAX.saturating_add(1)));
        assert!(!LoopTarget::Infinite.is_done(u32::MAX.saturating_add(1)));
        assert_eq!(LoopTarget::Infinite.count(), None);
        assert_eq!(LoopTarget::default(), LoopTarget::Count(1));
    }

    #[test]
    fn test_snapshot_flags() {
        let snapshot = SequenceRunState {
            state: PlaybackState::Paused,
            loop_index: 1,
            loop_target: Some(LoopTarget::Infinite),
        };
        assert!(snapshot.running());
        assert!(snapshot.paused());
    }
}
