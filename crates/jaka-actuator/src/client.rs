//! 运动执行器接口
//!
//! 厂商运动 SDK 的抽象边界。示教回放子系统只通过这个 trait 访问机械臂，
//! 真实的 SDK 绑定和 [`SimulatedActuator`](crate::SimulatedActuator) 都实现它。

use crate::error::ActuatorError;
use jaka_types::{CartesianPose, JointPose};

/// 运动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    /// 绝对位置（示教回放的所有移动都使用此模式）
    #[default]
    Absolute,
    /// 相对当前位置的增量
    Incremental,
}

/// 运动执行器 Trait
///
/// # 语义
///
/// - 所有方法都是同步调用，阻塞直到执行器应答
/// - `blocking = true` 的移动指令在运动完成后才返回
/// - 失败时返回 [`ActuatorError::Status`]，状态码原样透传
///
/// 实现必须是 `Send + Sync`：轮询线程、回放线程和控制线程会同时持有
/// 同一个 `Arc<dyn MotionActuator>`，执行器本身不提供互斥。
pub trait MotionActuator: Send + Sync {
    /// 连接到控制器
    fn connect(&self, address: &str) -> Result<(), ActuatorError>;

    /// 断开连接
    ///
    /// 默认实现为空操作。
    fn disconnect(&self) -> Result<(), ActuatorError> {
        Ok(())
    }

    /// 上电
    fn power_on(&self) -> Result<(), ActuatorError>;

    /// 下电
    fn power_off(&self) -> Result<(), ActuatorError>;

    /// 使能
    fn enable(&self) -> Result<(), ActuatorError>;

    /// 去使能
    fn disable(&self) -> Result<(), ActuatorError>;

    /// 中止当前运动
    fn motion_abort(&self) -> Result<(), ActuatorError>;

    /// 关闭控制柜
    fn shutdown(&self) -> Result<(), ActuatorError>;

    /// 关节空间移动
    ///
    /// # 参数
    ///
    /// - `target`: 目标关节位置（弧度）
    /// - `mode`: 绝对 / 增量
    /// - `blocking`: 是否等待运动完成
    /// - `speed`: 速度比例 [0.05, 1.0]
    fn move_joint(
        &self,
        target: &JointPose,
        mode: MoveMode,
        blocking: bool,
        speed: f64,
    ) -> Result<(), ActuatorError>;

    /// 笛卡尔空间直线移动
    ///
    /// `speed` 为末端线速度（mm/s）。
    fn move_linear(
        &self,
        target: &CartesianPose,
        mode: MoveMode,
        blocking: bool,
        speed: f64,
    ) -> Result<(), ActuatorError>;

    /// 读取当前关节位置
    fn joint_pose(&self) -> Result<JointPose, ActuatorError>;

    /// 读取当前末端位姿
    fn cartesian_pose(&self) -> Result<CartesianPose, ActuatorError>;

    /// 逆运动学求解
    ///
    /// 以 `reference` 为参考关节位置，求解到达 `target` 的关节位置。
    fn inverse_kinematics(
        &self,
        reference: &JointPose,
        target: &CartesianPose,
    ) -> Result<JointPose, ActuatorError>;
}
