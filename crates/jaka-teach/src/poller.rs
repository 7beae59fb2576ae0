//! 实时位姿同步
//!
//! 后台线程周期性读取关节位置（默认 200ms），在执行器就绪且未被挂起时
//! 发布 [`SyncEvent::Pose`]，并把最新结果保存为无锁快照。
//!
//! # 挂起
//!
//! 两种来源，任意一个生效即停止发布：
//!
//! - 操作员标志：[`LiveSyncPoller::suspend`] / [`LiveSyncPoller::resume`]（手动编辑关节时）
//! - [`SuspendGuard`]：RAII 计数，示教站在回放期间持有
//!
//! 读取失败只记录 debug 日志，不重试也不发事件。

use crate::event::{EventSink, SyncEvent};
use arc_swap::ArcSwapOption;
use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use jaka_actuator::ActuatorSession;
use jaka_types::{Deg, JointArray};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// 挂起状态
#[derive(Debug, Default)]
struct SuspendFlags {
    operator: AtomicBool,
    guards: AtomicUsize,
}

impl SuspendFlags {
    fn is_suspended(&self) -> bool {
        self.operator.load(Ordering::Acquire) || self.guards.load(Ordering::Acquire) > 0
    }
}

/// 挂起守卫
///
/// 存活期间轮询不发布位姿，Drop 时自动释放。
#[must_use = "the poller resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SuspendGuard {
    flags: Arc<SuspendFlags>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        self.flags.guards.fetch_sub(1, Ordering::AcqRel);
    }
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// 实时位姿同步器
pub struct LiveSyncPoller {
    session: Arc<ActuatorSession>,
    interval: Duration,
    events: EventSink,
    latest: Arc<ArcSwapOption<JointArray<Deg>>>,
    flags: Arc<SuspendFlags>,
    worker: Mutex<Option<Worker>>,
}

impl LiveSyncPoller {
    /// 创建同步器（未启动）
    pub fn new(session: Arc<ActuatorSession>, interval: Duration, events: EventSink) -> Self {
        Self {
            session,
            interval,
            events,
            latest: Arc::new(ArcSwapOption::empty()),
            flags: Arc::new(SuspendFlags::default()),
            worker: Mutex::new(None),
        }
    }

    /// 启动后台线程
    ///
    /// 已在运行时为空操作，返回 `false`。
    pub fn start(&self) -> bool {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return false;
        }

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let session = self.session.clone();
        let events = self.events.clone();
        let latest = self.latest.clone();
        let flags = self.flags.clone();
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name("jaka-sync".to_string())
            .spawn(move || {
                loop {
                    poll_once(&session, &flags, &latest, &events);
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                trace!("Sync worker exited");
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(Worker { stop_tx, handle });
                info!("Live sync started ({}ms)", interval.as_millis());
                true
            },
            Err(e) => {
                warn!("Failed to spawn sync worker: {}", e);
                false
            },
        }
    }

    /// 停止后台线程并等待其退出
    ///
    /// 未运行时为空操作，返回 `false`。
    pub fn stop(&self) -> bool {
        let Some(Worker { stop_tx, handle }) = self.worker.lock().take() else {
            return false;
        };
        drop(stop_tx);
        if handle.join().is_err() {
            warn!("Sync worker panicked");
        }
        info!("Live sync stopped");
        true
    }

    /// 是否在运行
    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// 操作员挂起（手动编辑关节时）
    pub fn suspend(&self) {
        self.flags.operator.store(true, Ordering::Release);
        debug!("Live sync suspended");
    }

    /// 解除操作员挂起
    pub fn resume(&self) {
        self.flags.operator.store(false, Ordering::Release);
        debug!("Live sync resumed");
    }

    /// 获取挂起守卫
    pub fn suspend_guard(&self) -> SuspendGuard {
        self.flags.guards.fetch_add(1, Ordering::AcqRel);
        SuspendGuard {
            flags: self.flags.clone(),
        }
    }

    /// 当前是否挂起（任一来源）
    pub fn is_suspended(&self) -> bool {
        self.flags.is_suspended()
    }

    /// 最近一次发布的位姿（度）
    pub fn latest(&self) -> Option<Arc<JointArray<Deg>>> {
        self.latest.load_full()
    }
}

impl Drop for LiveSyncPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_once(
    session: &ActuatorSession,
    flags: &SuspendFlags,
    latest: &ArcSwapOption<JointArray<Deg>>,
    events: &EventSink,
) {
    if !session.is_ready() || flags.is_suspended() {
        return;
    }
    match session.actuator().joint_pose() {
        Ok(pose) => {
            let degrees = pose.to_degrees();
            latest.store(Some(Arc::new(degrees)));
            events.emit(SyncEvent::Pose(degrees));
        },
        Err(e) => debug!("Sync read failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaka_actuator::SimulatedActuator;

    fn ready_session() -> Arc<ActuatorSession> {
        let session = Arc::new(ActuatorSession::new(Arc::new(SimulatedActuator::new())));
        session.connect("sim").unwrap();
        session.power_on().unwrap();
        session.enable().unwrap();
        session
    }

    #[test]
    fn test_start_stop_idempotent() {
        let poller = LiveSyncPoller::new(
            ready_session(),
            Duration::from_millis(10),
            EventSink::discard(),
        );
        assert!(!poller.stop());
        assert!(poller.start());
        assert!(!poller.start());
        assert!(poller.is_running());
        assert!(poller.stop());
        assert!(!poller.stop());
        assert!(!poller.is_running());
    }

    #[test]
    fn test_guards_nest() {
        let poller = LiveSyncPoller::new(
            ready_session(),
            Duration::from_millis(10),
            EventSink::discard(),
        );
        let a = poller.suspend_guard();
        let b = poller.suspend_guard();
        assert!(poller.is_suspended());
        drop(a);
        assert!(poller.is_suspended());
        drop(b);
        assert!(!poller.is_suspended());

        poller.suspend();
        let c = poller.suspend_guard();
        drop(c);
        assert!(poller.is_suspended());
        poller.resume();
        assert!(!poller.is_suspended());
    }
}
