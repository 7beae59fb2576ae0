//! 仿真执行器
//!
//! 不连接任何硬件的 [`MotionActuator`] 实现，供测试和命令行工具使用：
//!
//! - 按连接 / 上电 / 使能状态拒绝指令（返回仿真状态码）
//! - 阻塞移动按 `move_duration` 休眠，模拟运动耗时
//! - 记录每一次移动，便于断言
//! - 支持注入移动失败、读取失败和读取延迟
//!
//! 运动学是一个线性的玩具映射（见 [`SimulatedActuator::forward_kinematics`]），
//! 只保证正逆解互为反函数，不代表真实机械臂。

use crate::client::{MotionActuator, MoveMode};
use crate::error::{ActuatorError, ActuatorOp};
use jaka_types::{CartesianPose, JAKA_JOINT_LIMITS, Joint, JointPose, Rad};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// 仿真状态码
pub mod codes {
    /// 地址为空
    pub const INVALID_ADDRESS: i32 = 2;
    /// 未上电
    pub const NOT_POWERED: i32 = 3;
    /// 未使能
    pub const NOT_ENABLED: i32 = 4;
    /// 逆解无解（超出关节限位）
    pub const IK_UNREACHABLE: i32 = 5;
    /// 读取失败（注入）
    pub const READ_FAILED: i32 = 6;
}

/// 末端位置与关节角的比例（mm / rad）
const MM_PER_RAD: f64 = 100.0;

/// 一次移动记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimMove {
    /// 关节移动（记录的是解析后的绝对目标）
    Joint {
        /// 目标关节位置
        target: JointPose,
        /// 速度比例
        speed: f64,
    },
    /// 直线移动
    Linear {
        /// 目标末端位姿
        target: CartesianPose,
        /// 线速度（mm/s）
        speed: f64,
    },
}

impl SimMove {
    /// 速度参数
    pub fn speed(&self) -> f64 {
        match self {
            SimMove::Joint { speed, .. } | SimMove::Linear { speed, .. } => *speed,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    connected: bool,
    powered: bool,
    enabled: bool,
    joints: JointPose,
    moves: Vec<SimMove>,
    /// 第 N 次移动（从 0 开始，含失败的尝试）返回指定状态码
    move_failures: HashMap<usize, i32>,
    move_attempts: usize,
    fail_reads: bool,
}

/// 仿真执行器
#[derive(Debug)]
pub struct SimulatedActuator {
    state: Mutex<SimState>,
    move_duration: Duration,
    read_delay: Duration,
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedActuator {
    /// 创建仿真执行器（未连接，位于零位，移动瞬时完成）
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
            move_duration: Duration::ZERO,
            read_delay: Duration::ZERO,
        }
    }

    /// 已连接、已上电、已使能的仿真执行器
    pub fn ready() -> Self {
        let sim = Self::new();
        {
            let mut state = sim.state.lock();
            state.connected = true;
            state.powered = true;
            state.enabled = true;
        }
        sim
    }

    /// 设置阻塞移动的耗时
    pub fn with_move_duration(mut self, duration: Duration) -> Self {
        self.move_duration = duration;
        self
    }

    /// 设置读取延迟（用于模拟卡住的查询）
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// 设置初始关节位置
    pub fn with_joints(self, joints: JointPose) -> Self {
        self.state.lock().joints = joints;
        self
    }

    /// 注入移动失败：第 `attempt` 次移动（从 0 开始）返回 `code`
    pub fn fail_move_at(&self, attempt: usize, code: i32) {
        self.state.lock().move_failures.insert(attempt, code);
    }

    /// 注入读取失败
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// 当前关节位置（不经过连接检查）
    pub fn joints(&self) -> JointPose {
        self.state.lock().joints
    }

    /// 直接设置关节位置
    pub fn set_joints(&self, joints: JointPose) {
        self.state.lock().joints = joints;
    }

    /// 成功执行的移动
    pub fn moves(&self) -> Vec<SimMove> {
        self.state.lock().moves.clone()
    }

    /// 成功执行的移动次数
    pub fn move_count(&self) -> usize {
        self.state.lock().moves.len()
    }

    /// 移动尝试次数（含失败）
    pub fn move_attempts(&self) -> usize {
        self.state.lock().move_attempts
    }

    /// 仿真正解：x/y/z = J1/J2/J3 × 100 mm，rx/ry/rz = J4/J5/J6
    pub fn forward_kinematics(joints: &JointPose) -> CartesianPose {
        CartesianPose::new(
            joints[Joint::J1].0 * MM_PER_RAD,
            joints[Joint::J2].0 * MM_PER_RAD,
            joints[Joint::J3].0 * MM_PER_RAD,
            joints[Joint::J4],
            joints[Joint::J5],
            joints[Joint::J6],
        )
    }

    /// 仿真逆解（正解的反函数），结果超出关节限位时无解
    pub fn solve_inverse(target: &CartesianPose) -> Option<JointPose> {
        let joints = JointPose::new([
            Rad(target.x / MM_PER_RAD),
            Rad(target.y / MM_PER_RAD),
            Rad(target.z / MM_PER_RAD),
            target.rx,
            target.ry,
            target.rz,
        ]);
        JAKA_JOINT_LIMITS
            .validate_pose(&joints.to_degrees())
            .ok()
            .map(|_| joints)
    }

    fn require_connected(state: &SimState) -> Result<(), ActuatorError> {
        if state.connected {
            Ok(())
        } else {
            Err(ActuatorError::NotConnected)
        }
    }

    fn status(op: ActuatorOp, code: i32) -> ActuatorError {
        ActuatorError::Status { op, code }
    }

    /// 移动前的公共检查（连接、使能、注入的失败）
    fn begin_move(&self, op: ActuatorOp) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::require_connected(&state)?;
        let attempt = state.move_attempts;
        state.move_attempts += 1;
        if !state.enabled {
            return Err(Self::status(op, codes::NOT_ENABLED));
        }
        if let Some(code) = state.move_failures.remove(&attempt) {
            debug!("Injected failure for move #{}: code {}", attempt, code);
            return Err(Self::status(op, code));
        }
        Ok(())
    }

    fn finish_move(&self, joints: JointPose, record: SimMove, blocking: bool) {
        if blocking && !self.move_duration.is_zero() {
            thread::sleep(self.move_duration);
        }
        let mut state = self.state.lock();
        state.joints = joints;
        state.moves.push(record);
        trace!("Simulated move #{} done", state.moves.len());
    }

    fn read<T>(
        &self,
        op: ActuatorOp,
        f: impl FnOnce(&SimState) -> T,
    ) -> Result<T, ActuatorError> {
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        let state = self.state.lock();
        Self::require_connected(&state)?;
        if state.fail_reads {
            return Err(Self::status(op, codes::READ_FAILED));
        }
        Ok(f(&state))
    }
}

impl MotionActuator for SimulatedActuator {
    fn connect(&self, address: &str) -> Result<(), ActuatorError> {
        if address.trim().is_empty() {
            return Err(Self::status(ActuatorOp::Connect, codes::INVALID_ADDRESS));
        }
        self.state.lock().connected = true;
        debug!("Simulated actuator connected to {}", address);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        state.connected = false;
        state.powered = false;
        state.enabled = false;
        Ok(())
    }

    fn power_on(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::require_connected(&state)?;
        state.powered = true;
        Ok(())
    }

    fn power_off(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::require_connected(&state)?;
        state.powered = false;
        state.enabled = false;
        Ok(())
    }

    fn enable(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::require_connected(&state)?;
        if !state.powered {
            return Err(Self::status(ActuatorOp::Enable, codes::NOT_POWERED));
        }
        state.enabled = true;
        Ok(())
    }

    fn disable(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::require_connected(&state)?;
        state.enabled = false;
        Ok(())
    }

    fn motion_abort(&self) -> Result<(), ActuatorError> {
        Self::require_connected(&self.state.lock())
    }

    fn shutdown(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        Self::require_connected(&state)?;
        state.connected = false;
        state.powered = false;
        state.enabled = false;
        Ok(())
    }

    fn move_joint(
        &self,
        target: &JointPose,
        mode: MoveMode,
        blocking: bool,
        speed: f64,
    ) -> Result<(), ActuatorError> {
        self.begin_move(ActuatorOp::MoveJoint)?;
        let resolved = match mode {
            MoveMode::Absolute => *target,
            MoveMode::Incremental => {
                let current = self.state.lock().joints;
                JointPose::new(std::array::from_fn(|i| current[i] + target[i]))
            },
        };
        self.finish_move(
            resolved,
            SimMove::Joint {
                target: resolved,
                speed,
            },
            blocking,
        );
        Ok(())
    }

    fn move_linear(
        &self,
        target: &CartesianPose,
        mode: MoveMode,
        blocking: bool,
        speed: f64,
    ) -> Result<(), ActuatorError> {
        self.begin_move(ActuatorOp::MoveLinear)?;
        let resolved = match mode {
            MoveMode::Absolute => *target,
            MoveMode::Incremental => {
                let current = Self::forward_kinematics(&self.state.lock().joints);
                CartesianPose::new(
                    current.x + target.x,
                    current.y + target.y,
                    current.z + target.z,
                    current.rx + target.rx,
                    current.ry + target.ry,
                    current.rz + target.rz,
                )
            },
        };
        let joints = Self::solve_inverse(&resolved)
            .ok_or_else(|| Self::status(ActuatorOp::MoveLinear, codes::IK_UNREACHABLE))?;
        self.finish_move(
            joints,
            SimMove::Linear {
                target: resolved,
                speed,
            },
            blocking,
        );
        Ok(())
    }

    fn joint_pose(&self) -> Result<JointPose, ActuatorError> {
        self.read(ActuatorOp::JointPose, |s| s.joints)
    }

    fn cartesian_pose(&self) -> Result<CartesianPose, ActuatorError> {
        self.read(ActuatorOp::CartesianPose, |s| {
            Self::forward_kinematics(&s.joints)
        })
    }

    fn inverse_kinematics(
        &self,
        _reference: &JointPose,
        target: &CartesianPose,
    ) -> Result<JointPose, ActuatorError> {
        Self::require_connected(&self.state.lock())?;
        Self::solve_inverse(target)
            .ok_or_else(|| Self::status(ActuatorOp::InverseKinematics, codes::IK_UNREACHABLE))
    }
}
