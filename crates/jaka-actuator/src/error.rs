//! 执行器错误类型定义

use std::fmt;
use thiserror::Error;

/// 执行器操作（用于错误信息和日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorOp {
    Connect,
    Disconnect,
    PowerOn,
    PowerOff,
    Enable,
    Disable,
    MotionAbort,
    Shutdown,
    MoveJoint,
    MoveLinear,
    JointPose,
    CartesianPose,
    InverseKinematics,
}

impl ActuatorOp {
    /// 操作名称
    pub const fn name(self) -> &'static str {
        match self {
            ActuatorOp::Connect => "connect",
            ActuatorOp::Disconnect => "disconnect",
            ActuatorOp::PowerOn => "power_on",
            ActuatorOp::PowerOff => "power_off",
            ActuatorOp::Enable => "enable",
            ActuatorOp::Disable => "disable",
            ActuatorOp::MotionAbort => "motion_abort",
            ActuatorOp::Shutdown => "shutdown",
            ActuatorOp::MoveJoint => "move_joint",
            ActuatorOp::MoveLinear => "move_linear",
            ActuatorOp::JointPose => "joint_pose",
            ActuatorOp::CartesianPose => "cartesian_pose",
            ActuatorOp::InverseKinematics => "inverse_kinematics",
        }
    }
}

impl fmt::Display for ActuatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 执行器错误
///
/// 厂商状态码是不透明的：只记录和显示，不做匹配。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// 厂商接口返回非零状态码
    #[error("{op} failed with status code {code}")]
    Status {
        /// 失败的操作
        op: ActuatorOp,
        /// 厂商状态码
        code: i32,
    },

    /// 尚未连接
    #[error("Actuator not connected")]
    NotConnected,

    /// 调用超时（工作线程被放弃）
    #[error("{op} timed out after {timeout_ms}ms")]
    Timeout {
        /// 超时的操作
        op: ActuatorOp,
        /// 超时时间（毫秒）
        timeout_ms: u64,
    },

    /// 工作线程异常退出（未返回结果）
    #[error("Worker for {op} terminated without a result")]
    WorkerLost {
        /// 操作
        op: ActuatorOp,
    },
}

impl ActuatorError {
    /// 厂商状态码（如果有）
    pub fn status_code(&self) -> Option<i32> {
        match self {
            ActuatorError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 是否为超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, ActuatorError::Timeout { .. })
    }
}

/// 将厂商状态码转换为 `Result`（0 表示成功）
///
/// 供封装原生 SDK 的实现使用。
#[inline]
pub fn check_status(op: ActuatorOp, code: i32) -> Result<(), ActuatorError> {
    if code == 0 {
        Ok(())
    } else {
        Err(ActuatorError::Status { op, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status(ActuatorOp::MoveJoint, 0).is_ok());

        let err = check_status(ActuatorOp::MoveJoint, -4).unwrap_err();
        assert_eq!(err.status_code(), Some(-4));
        assert_eq!(err.to_string(), "move_joint failed with status code -4");
    }

    #[test]
    fn test_timeout_display() {
        let err = ActuatorError::Timeout {
            op: ActuatorOp::JointPose,
            timeout_ms: 500,
        };
        assert!(err.is_timeout());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "joint_pose timed out after 500ms");
    }

    #[test]
    fn test_not_connected_display() {
        assert_eq!(
            ActuatorError::NotConnected.to_string(),
            "Actuator not connected"
        );
    }
}
