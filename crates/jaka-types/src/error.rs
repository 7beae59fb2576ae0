//! 输入校验错误
//!
//! 校验失败时不会下发任何执行器指令，由调用方直接反馈给操作员。

use crate::joint::Joint;
use thiserror::Error;

/// 校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// 关节角度超出限位
    #[error("Joint {joint} out of range: {value}° not in [{min}, {max}]°")]
    OutOfRange {
        /// 关节
        joint: Joint,
        /// 请求的角度（度）
        value: f64,
        /// 下限（度）
        min: f64,
        /// 上限（度）
        max: f64,
    },

    /// 关节编号无效（有效范围 1-6）
    #[error("Invalid joint number {0} (expected 1..=6)")]
    InvalidJoint(usize),

    /// 非数字输入
    #[error("Joint {joint} value is not a number: {input:?}")]
    NotANumber {
        /// 关节
        joint: Joint,
        /// 原始输入
        input: String,
    },

    /// 延时无效（必须在 `[0, MAX_DELAY_SECS]` 内）
    #[error("Invalid delay: {0}s (must be within [0, 86400]s)")]
    InvalidDelay(f64),
}

impl ValidationError {
    /// 是否为限位错误
    pub fn is_limit_error(&self) -> bool {
        matches!(self, ValidationError::OutOfRange { .. })
    }
}
