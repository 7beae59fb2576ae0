//! 执行器会话
//!
//! 记录连接 / 上电 / 使能状态，替代控制面板上散落的布尔标志。
//! 示教回放子系统只依赖 [`ActuatorSession`]，不关心状态由哪个界面维护。
//!
//! # 状态转换
//!
//! ```text
//! Disconnected ──connect──▶ Connected ──power_on──▶ Powered ──enable──▶ Enabled
//!      ▲                        ▲                      ▲                   │
//!      │                        └────power_off─────────┴─────disable───────┘
//!      └──────────shutdown / disconnect（任意状态）
//! ```
//!
//! 执行器调用失败时状态保持不变。

use crate::client::MotionActuator;
use crate::error::{ActuatorError, ActuatorOp};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{info, warn};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum SessionState {
    /// 未连接（默认）
    #[default]
    Disconnected = 0,
    /// 已连接
    Connected = 1,
    /// 已上电
    Powered = 2,
    /// 已使能（可以运动）
    Enabled = 3,
}

impl SessionState {
    /// 从 u8 转换
    ///
    /// 无效值视为 Disconnected。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connected,
            2 => Self::Powered,
            3 => Self::Enabled,
            _ => Self::Disconnected,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否已连接
    pub fn is_connected(self) -> bool {
        self >= Self::Connected
    }

    /// 是否可以运动（已使能）
    pub fn is_ready(self) -> bool {
        self == Self::Enabled
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Powered => "powered",
            SessionState::Enabled => "enabled",
        };
        f.write_str(name)
    }
}

/// 会话状态（原子版本，用于线程间共享）
#[derive(Debug, Default)]
pub struct AtomicSessionState {
    inner: AtomicU8,
}

impl AtomicSessionState {
    /// 创建新的原子状态
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self) -> SessionState {
        SessionState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 设置状态
    pub fn set(&self, state: SessionState) {
        self.inner.store(state.as_u8(), Ordering::Release);
    }
}

/// 执行器会话
///
/// 持有共享的执行器句柄和会话状态。所有方法都可以从任意线程调用。
pub struct ActuatorSession {
    actuator: Arc<dyn MotionActuator>,
    state: AtomicSessionState,
}

impl ActuatorSession {
    /// 创建新的会话（初始为 Disconnected）
    pub fn new(actuator: Arc<dyn MotionActuator>) -> Self {
        Self {
            actuator,
            state: AtomicSessionState::default(),
        }
    }

    /// 执行器句柄
    pub fn actuator(&self) -> &Arc<dyn MotionActuator> {
        &self.actuator
    }

    /// 当前状态
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// 是否已连接
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// 是否可以运动
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// 连接控制器
    pub fn connect(&self, address: &str) -> Result<SessionState, ActuatorError> {
        self.actuator.connect(address).inspect_err(|e| {
            warn!("Connect to {} failed: {}", address, e);
        })?;
        info!("Connected to {}", address);
        Ok(self.transition(SessionState::Connected))
    }

    /// 断开连接
    pub fn disconnect(&self) -> Result<SessionState, ActuatorError> {
        self.require_connected()?;
        self.actuator.disconnect()?;
        info!("Disconnected");
        Ok(self.transition(SessionState::Disconnected))
    }

    /// 上电
    pub fn power_on(&self) -> Result<SessionState, ActuatorError> {
        self.require_connected()?;
        self.actuator.power_on()?;
        info!("Powered on");
        let next = self.state().max(SessionState::Powered);
        Ok(self.transition(next))
    }

    /// 下电
    ///
    /// 先去使能再下电。去使能失败只记录日志，仍然尝试下电。
    pub fn power_off(&self) -> Result<SessionState, ActuatorError> {
        self.require_connected()?;
        if let Err(e) = self.actuator.disable() {
            warn!("Disable before power off failed: {}", e);
        }
        self.actuator.power_off()?;
        info!("Powered off");
        Ok(self.transition(SessionState::Connected))
    }

    /// 使能
    pub fn enable(&self) -> Result<SessionState, ActuatorError> {
        self.require_connected()?;
        self.actuator.enable()?;
        info!("Enabled");
        Ok(self.transition(SessionState::Enabled))
    }

    /// 去使能
    pub fn disable(&self) -> Result<SessionState, ActuatorError> {
        self.require_connected()?;
        self.actuator.disable()?;
        info!("Disabled");
        let next = self.state().min(SessionState::Powered);
        Ok(self.transition(next))
    }

    /// 关闭控制柜
    ///
    /// 先中止运动再关机。中止失败只记录日志。
    pub fn shutdown(&self) -> Result<SessionState, ActuatorError> {
        self.require_connected()?;
        if let Err(e) = self.actuator.motion_abort() {
            warn!("{} before shutdown failed: {}", ActuatorOp::MotionAbort, e);
        }
        self.actuator.shutdown()?;
        info!("Controller shut down");
        Ok(self.transition(SessionState::Disconnected))
    }

    fn require_connected(&self) -> Result<(), ActuatorError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ActuatorError::NotConnected)
        }
    }

    fn transition(&self, next: SessionState) -> SessionState {
        self.state.set(next);
        next
    }
}

impl fmt::Debug for ActuatorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActuatorSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
