//! 带超时的执行器包装
//!
//! 厂商 SDK 的调用可能无限期阻塞。[`TimeoutActuator`] 把每次调用放到独立线程中执行，
//! 通过 `crossbeam_channel::bounded(1)` 等待结果；超时后返回
//! [`ActuatorError::Timeout`]，卡住的工作线程被放弃（不会被强制终止）。
//!
//! 未配置超时的类别直接在调用线程上执行。

use crate::client::{MotionActuator, MoveMode};
use crate::error::{ActuatorError, ActuatorOp};
use crossbeam_channel::{RecvTimeoutError, bounded};
use jaka_types::{CartesianPose, JointPose};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// 各类调用的超时时间
///
/// `None` 表示不限时。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorTimeouts {
    /// 查询类：关节位置、末端位姿、逆解
    pub query: Option<Duration>,
    /// 指令类：连接、上下电、使能、中止、关机
    pub command: Option<Duration>,
    /// 运动类：关节移动、直线移动
    pub motion: Option<Duration>,
}

impl ActuatorTimeouts {
    /// 全部不限时
    pub const NONE: Self = ActuatorTimeouts {
        query: None,
        command: None,
        motion: None,
    };

    /// 操作对应的超时
    pub fn for_op(&self, op: ActuatorOp) -> Option<Duration> {
        match op {
            ActuatorOp::JointPose | ActuatorOp::CartesianPose | ActuatorOp::InverseKinematics => {
                self.query
            },
            ActuatorOp::MoveJoint | ActuatorOp::MoveLinear => self.motion,
            ActuatorOp::Connect
            | ActuatorOp::Disconnect
            | ActuatorOp::PowerOn
            | ActuatorOp::PowerOff
            | ActuatorOp::Enable
            | ActuatorOp::Disable
            | ActuatorOp::MotionAbort
            | ActuatorOp::Shutdown => self.command,
        }
    }
}

/// 带超时的执行器
pub struct TimeoutActuator {
    inner: Arc<dyn MotionActuator>,
    timeouts: ActuatorTimeouts,
}

impl TimeoutActuator {
    /// 包装执行器
    pub fn new(inner: Arc<dyn MotionActuator>, timeouts: ActuatorTimeouts) -> Self {
        Self { inner, timeouts }
    }

    /// 当前超时配置
    pub fn timeouts(&self) -> ActuatorTimeouts {
        self.timeouts
    }

    fn call<T, F>(&self, op: ActuatorOp, f: F) -> Result<T, ActuatorError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MotionActuator) -> Result<T, ActuatorError> + Send + 'static,
    {
        let Some(limit) = self.timeouts.for_op(op) else {
            return f(self.inner.as_ref());
        };

        let inner = Arc::clone(&self.inner);
        let (tx, rx) = bounded(1);
        thread::Builder::new()
            .name(format!("jaka-{op}"))
            .spawn(move || {
                // 接收端可能已因超时放弃
                let _ = tx.send(f(inner.as_ref()));
            })
            .map_err(|_| ActuatorError::WorkerLost { op })?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let timeout_ms = limit.as_millis() as u64;
                warn!("{} exceeded {}ms, abandoning worker", op, timeout_ms);
                Err(ActuatorError::Timeout { op, timeout_ms })
            },
            Err(RecvTimeoutError::Disconnected) => Err(ActuatorError::WorkerLost { op }),
        }
    }
}

impl MotionActuator for TimeoutActuator {
    fn connect(&self, address: &str) -> Result<(), ActuatorError> {
        let address = address.to_string();
        self.call(ActuatorOp::Connect, move |a| a.connect(&address))
    }

    fn disconnect(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::Disconnect, |a| a.disconnect())
    }

    fn power_on(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::PowerOn, |a| a.power_on())
    }

    fn power_off(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::PowerOff, |a| a.power_off())
    }

    fn enable(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::Enable, |a| a.enable())
    }

    fn disable(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::Disable, |a| a.disable())
    }

    fn motion_abort(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::MotionAbort, |a| a.motion_abort())
    }

    fn shutdown(&self) -> Result<(), ActuatorError> {
        self.call(ActuatorOp::Shutdown, |a| a.shutdown())
    }

    fn move_joint(
        &self,
        target: &JointPose,
        mode: MoveMode,
        blocking: bool,
        speed: f64,
    ) -> Result<(), ActuatorError> {
        let target = *target;
        self.call(ActuatorOp::MoveJoint, move |a| {
            a.move_joint(&target, mode, blocking, speed)
        })
    }

    fn move_linear(
        &self,
        target: &CartesianPose,
        mode: MoveMode,
        blocking: bool,
        speed: f64,
    ) -> Result<(), ActuatorError> {
        let target = *target;
        self.call(ActuatorOp::MoveLinear, move |a| {
            a.move_linear(&target, mode, blocking, speed)
        })
    }

    fn joint_pose(&self) -> Result<JointPose, ActuatorError> {
        self.call(ActuatorOp::JointPose, |a| a.joint_pose())
    }

    fn cartesian_pose(&self) -> Result<CartesianPose, ActuatorError> {
        self.call(ActuatorOp::CartesianPose, |a| a.cartesian_pose())
    }

    fn inverse_kinematics(
        &self,
        reference: &JointPose,
        target: &CartesianPose,
    ) -> Result<JointPose, ActuatorError> {
        let reference = *reference;
        let target = *target;
        self.call(ActuatorOp::InverseKinematics, move |a| {
            a.inverse_kinematics(&reference, &target)
        })
    }
}
