//! # JAKA Actuator - 运动执行器边界
//!
//! 厂商运动 SDK 与示教回放子系统之间的接口层：
//!
//! - `client` - [`MotionActuator`] trait 与运动模式
//! - `session` - 连接 / 上电 / 使能状态（[`ActuatorSession`]）
//! - `timeout` - 带超时的执行器包装（[`TimeoutActuator`]）
//! - `sim` - 仿真执行器（[`SimulatedActuator`]）
//! - `error` - 执行器错误
//!
//! 真实 SDK 绑定不在本 crate 中，实现 [`MotionActuator`] 即可接入。

pub mod client;
pub mod error;
pub mod session;
pub mod sim;
pub mod timeout;

pub use client::{MotionActuator, MoveMode};
pub use error::{ActuatorError, ActuatorOp, check_status};
pub use session::{ActuatorSession, AtomicSessionState, SessionState};
pub use sim::{SimMove, SimulatedActuator};
pub use timeout::{ActuatorTimeouts, TimeoutActuator};
