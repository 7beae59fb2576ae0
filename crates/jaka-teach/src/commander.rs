//! 操作员运动指令
//!
//! 所有显式给定关节角的指令下发前都经过限位校验，校验失败时不调用执行器。
//! 所有指令都要求执行器已使能。

use crate::config::SmoothMoveConfig;
use crate::error::MotionError;
use crate::interpolator::{SmoothMoveReport, smooth_move};
use jaka_actuator::{ActuatorSession, MoveMode};
use jaka_types::{
    CartesianPose, Deg, JOINT_COUNT, JAKA_JOINT_LIMITS, Joint, JointArray, JointLimits, JointPose,
    SharedSpeed, ValidationError, parse_degrees,
};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

/// 解析 6 个关节的角度输入（度）
///
/// 返回第一个非数字输入对应的 [`ValidationError::NotANumber`]。
pub fn parse_joint_targets<S: AsRef<str>>(
    inputs: &[S; JOINT_COUNT],
) -> Result<JointArray<Deg>, ValidationError> {
    let mut targets = JointArray::splat(Deg::ZERO);
    for joint in Joint::ALL {
        targets[joint] = parse_degrees(joint, inputs[joint.index()].as_ref())?;
    }
    Ok(targets)
}

/// 运动指令器
pub struct MotionCommander {
    session: Arc<ActuatorSession>,
    speed: Arc<SharedSpeed>,
    smooth: SmoothMoveConfig,
    limits: JointLimits,
}

impl MotionCommander {
    /// 创建指令器（使用 JAKA 默认限位）
    pub fn new(
        session: Arc<ActuatorSession>,
        speed: Arc<SharedSpeed>,
        smooth: SmoothMoveConfig,
    ) -> Self {
        Self {
            session,
            speed,
            smooth,
            limits: JAKA_JOINT_LIMITS,
        }
    }

    fn require_ready(&self) -> Result<(), MotionError> {
        if self.session.is_ready() {
            Ok(())
        } else {
            Err(MotionError::NotReady)
        }
    }

    /// 单关节平滑移动
    ///
    /// `joint_number` 为 1-6。终点先做限位校验，再交给插值器。
    pub fn jog_joint(
        &self,
        joint_number: usize,
        target: Deg,
        cancel: &AtomicBool,
    ) -> Result<SmoothMoveReport, MotionError> {
        self.require_ready()?;
        self.limits.validate(joint_number, target)?;
        let joint =
            Joint::from_number(joint_number).ok_or(ValidationError::InvalidJoint(joint_number))?;

        info!(
            "Smooth {} -> {} | speed={:.2}",
            joint,
            target,
            self.speed.ratio()
        );
        let report = smooth_move(
            self.session.actuator().as_ref(),
            joint,
            target,
            &self.speed,
            &self.smooth,
            cancel,
        )?;
        if report.steps_failed > 0 {
            warn!(
                "Smooth {} finished with {} failed steps",
                joint, report.steps_failed
            );
        }
        Ok(report)
    }

    /// 全关节移动（一次阻塞的绝对移动）
    pub fn move_all(&self, targets: &JointArray<Deg>) -> Result<(), MotionError> {
        self.require_ready()?;
        self.limits.validate_pose(targets)?;

        info!("Move all joints to {} | speed={:.2}", targets, self.speed.ratio());
        self.move_to(&targets.to_radians())
    }

    /// 回到零位
    pub fn move_home(&self) -> Result<(), MotionError> {
        self.require_ready()?;
        info!("Move home | speed={:.2}", self.speed.ratio());
        self.move_to(&JointPose::HOME)
    }

    fn move_to(&self, pose: &JointPose) -> Result<(), MotionError> {
        self.session
            .actuator()
            .move_joint(pose, MoveMode::Absolute, true, self.speed.ratio())
            .inspect_err(|e| warn!("Joint move failed: {}", e))?;
        Ok(())
    }

    /// 读取末端位姿
    pub fn cartesian_pose(&self) -> Result<CartesianPose, MotionError> {
        self.require_ready()?;
        let pose = self.session.actuator().cartesian_pose()?;
        info!("TCP pose: {}", pose);
        Ok(pose)
    }

    /// 以当前关节位置为参考求逆解
    fn solve(&self, target: &CartesianPose) -> Result<JointPose, MotionError> {
        let actuator = self.session.actuator();
        let reference = actuator.joint_pose()?;
        let solution = actuator
            .inverse_kinematics(&reference, target)
            .inspect_err(|e| warn!("Inverse kinematics failed: {}", e))?;
        info!("IK solution: {}", solution.to_degrees());
        Ok(solution)
    }

    /// 笛卡尔直线移动
    ///
    /// 先求逆解确认可达，再以 `100 × 速度比例` mm/s 下发直线移动。
    /// 返回逆解结果。
    pub fn move_linear(&self, target: &CartesianPose) -> Result<JointPose, MotionError> {
        self.require_ready()?;
        let velocity = self.speed.get().linear_velocity();
        info!("Move TCP -> {} | speed={:.2}mm/s", target, velocity);

        let solution = self.solve(target)?;
        self.session
            .actuator()
            .move_linear(target, MoveMode::Absolute, true, velocity)
            .inspect_err(|e| warn!("Linear move failed: {}", e))?;
        Ok(solution)
    }

    /// 求逆解后以关节移动到达笛卡尔目标
    ///
    /// 返回逆解结果。
    pub fn move_joint_to_cartesian(
        &self,
        target: &CartesianPose,
    ) -> Result<JointPose, MotionError> {
        self.require_ready()?;
        info!("Joint move to TCP {} | speed={:.2}", target, self.speed.ratio());

        let solution = self.solve(target)?;
        self.move_to(&solution)?;
        Ok(solution)
    }
}
