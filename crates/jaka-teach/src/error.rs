//! 示教回放错误类型

use jaka_actuator::ActuatorError;
use jaka_types::ValidationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 运动指令错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// 输入校验失败（未下发任何指令）
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// 执行器调用失败
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// 平滑移动中途失败（`StepFailurePolicy::Abort`）
    #[error("Smooth move aborted at step {step}: {source}")]
    StepFailed {
        /// 失败的步序号（从 1 开始）
        step: u32,
        /// 执行器错误
        source: ActuatorError,
    },

    /// 执行器未就绪（未连接或未使能）
    #[error("Actuator not ready (connect and enable first)")]
    NotReady,
}

/// 序列回放错误
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// 点位列表为空
    #[error("No taught points to play")]
    NoPoints,

    /// 执行器未就绪
    #[error("Actuator not ready (connect and enable first)")]
    NotReady,

    /// 已有序列在运行
    #[error("A sequence is already running")]
    AlreadyRunning,

    /// 循环次数无效
    #[error("Invalid loop count {0} (must be at least 1)")]
    InvalidLoopCount(u32),

    /// 无法启动回放线程
    #[error("Failed to spawn playback worker: {0}")]
    Spawn(#[source] io::Error),
}

/// 点位存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 没有点位可保存
    #[error("No points to save")]
    NothingToSave,

    /// 执行器未连接
    #[error("Actuator not connected")]
    NotReady,

    /// 文件读写失败
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: io::Error,
    },

    /// 文件格式错误
    #[error("Malformed point file at line {line}: {reason}")]
    Malformed {
        /// 行号（从 1 开始）
        line: usize,
        /// 原因
        reason: String,
    },

    /// 输入校验失败
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// 读取位姿失败
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读写失败
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置值无效
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 示教站统一错误
#[derive(Error, Debug)]
pub enum TeachError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TeachError {
    /// 是否为“未就绪”类错误
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            TeachError::Motion(MotionError::NotReady)
                | TeachError::Playback(PlaybackError::NotReady)
                | TeachError::Store(StoreError::NotReady)
                | TeachError::Actuator(ActuatorError::NotConnected)
        )
    }
}
