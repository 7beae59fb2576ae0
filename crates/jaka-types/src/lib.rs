//! # JAKA Types - 基础值类型
//!
//! 示教回放子系统共用的纯数据类型，不依赖执行器或任何 IO：
//!
//! - `units` - 弧度 / 角度 NewType
//! - `joint` - 关节枚举与 6 关节数组（[`JointPose`]）
//! - `cartesian` - 末端位姿
//! - `limits` - 关节限位校验
//! - `speed` - 速度百分比量化与共享速度
//! - `error` - 校验错误
//!
//! ## Feature Flags
//!
//! - `serde` - 为值类型派生 `Serialize` / `Deserialize`

pub mod cartesian;
pub mod error;
pub mod joint;
pub mod limits;
pub mod speed;
pub mod units;

// 重新导出常用类型
pub use cartesian::CartesianPose;
pub use error::ValidationError;
pub use joint::{JOINT_COUNT, Joint, JointArray, JointPose};
pub use limits::{
    JAKA_JOINT_LIMITS, JointLimits, JointRange, MAX_DELAY_SECS, parse_degrees, validate,
    validate_delay,
};
pub use speed::{SharedSpeed, SpeedSetting};
pub use units::{Deg, Rad};
