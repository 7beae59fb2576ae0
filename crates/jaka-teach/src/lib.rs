//! # JAKA Teach - 示教回放
//!
//! 六轴机械臂的示教与回放子系统：
//!
//! - `store` - 示教点位存储与文件格式
//! - `interpolator` - 单关节平滑移动
//! - `commander` - 经过限位校验的操作员运动指令
//! - `player` - 循环回放状态机（暂停 / 恢复 / 停止）
//! - `poller` - 实时位姿同步
//! - `station` - 控制面统一入口（[`TeachStation`]）
//! - `config` - TOML 配置
//! - `event` - 后台线程事件
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use jaka_actuator::SimulatedActuator;
//! use jaka_teach::{LoopTarget, TeachConfig, TeachStation};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), jaka_teach::TeachError> {
//! let (station, events) = TeachStation::new(
//!     Arc::new(SimulatedActuator::new()),
//!     TeachConfig::default(),
//! )?;
//!
//! station.connect("10.5.5.100")?;
//! station.power_on()?;
//! station.enable()?;
//!
//! station.record(Some("Pick"), Some(0.5))?;
//! station.run(LoopTarget::Count(3))?;
//! let summary = station.wait();
//! # let _ = (events, summary);
//! # Ok(())
//! # }
//! ```

pub mod commander;
pub mod config;
pub mod error;
pub mod event;
pub mod interpolator;
pub mod player;
pub mod poller;
pub mod station;
pub mod store;

pub use commander::{MotionCommander, parse_joint_targets};
pub use config::{
    PlaybackConfig, SmoothMoveConfig, StepFailurePolicy, SyncConfig, SyncPolicy, TeachConfig,
    TimeoutConfig,
};
pub use error::{ConfigError, MotionError, PlaybackError, StoreError, TeachError};
pub use event::{EventReceiver, EventSink, PlaybackEvent, PlaybackOutcome, SyncEvent, TeachEvent};
pub use interpolator::{SmoothMoveReport, SmoothPath, smooth_move};
pub use player::{
    AtomicPlaybackState, LoopTarget, PlaybackState, PlaybackSummary, SequencePlayer,
    SequenceRunState,
};
pub use poller::{LiveSyncPoller, SuspendGuard};
pub use station::TeachStation;
pub use store::{PointStore, TaughtPoint};
