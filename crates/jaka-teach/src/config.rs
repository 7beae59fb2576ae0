//! 示教站配置
//!
//! 所有时间常量都可以通过 TOML 文件覆盖，缺省字段使用默认值：
//!
//! ```toml
//! speed_percent = 20.0
//!
//! [sync]
//! interval_ms = 200
//! policy = "concurrent"            # 或 "suspend_during_playback"
//!
//! [playback]
//! pause_poll_ms = 200
//!
//! [smooth]
//! steps = 20
//! duration_secs = 1.0
//! on_step_failure = "continue"     # 或 "abort"
//!
//! [timeouts]                       # 可选，缺省时不限时
//! query_ms = 500
//! command_ms = 2000
//! motion_ms = 30000
//! ```

use crate::error::ConfigError;
use jaka_actuator::ActuatorTimeouts;
use jaka_types::SpeedSetting;
use jaka_types::speed::DEFAULT_SPEED_PERCENT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 轮询与回放的并发策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// 回放期间轮询照常进行（默认）
    #[default]
    Concurrent,
    /// 回放期间暂停轮询
    SuspendDuringPlayback,
}

/// 平滑移动中某一步失败后的处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepFailurePolicy {
    /// 记录日志并继续下一步（默认）
    #[default]
    Continue,
    /// 立即停止
    Abort,
}

/// 位姿同步配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 轮询间隔（毫秒）
    pub interval_ms: u64,
    /// 与回放的并发策略
    pub policy: SyncPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            policy: SyncPolicy::Concurrent,
        }
    }
}

impl SyncConfig {
    /// 轮询间隔
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// 回放配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// 暂停时的检查间隔（毫秒）
    pub pause_poll_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { pause_poll_ms: 200 }
    }
}

impl PlaybackConfig {
    /// 暂停检查间隔
    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }
}

/// 平滑移动配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothMoveConfig {
    /// 插值步数
    pub steps: u32,
    /// 总时长（秒），平均分配到每一步之后的等待
    pub duration_secs: f64,
    /// 某一步失败后的处理
    pub on_step_failure: StepFailurePolicy,
}

impl Default for SmoothMoveConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            duration_secs: 1.0,
            on_step_failure: StepFailurePolicy::Continue,
        }
    }
}

impl SmoothMoveConfig {
    /// 每一步之后的等待时间
    pub fn step_delay(&self) -> Duration {
        if self.steps == 0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.duration_secs / self.steps as f64)
            .unwrap_or(Duration::ZERO)
    }
}

/// 执行器调用超时（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_ms: Option<u64>,
}

impl TimeoutConfig {
    /// 转换为执行器超时设置
    pub fn to_timeouts(&self) -> ActuatorTimeouts {
        ActuatorTimeouts {
            query: self.query_ms.map(Duration::from_millis),
            command: self.command_ms.map(Duration::from_millis),
            motion: self.motion_ms.map(Duration::from_millis),
        }
    }
}

/// 示教站配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachConfig {
    /// 初始速度百分比
    pub speed_percent: f64,
    /// 位姿同步
    pub sync: SyncConfig,
    /// 回放
    pub playback: PlaybackConfig,
    /// 平滑移动
    pub smooth: SmoothMoveConfig,
    /// 执行器调用超时（缺省时不限时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutConfig>,
}

impl Default for TeachConfig {
    fn default() -> Self {
        Self {
            speed_percent: DEFAULT_SPEED_PERCENT,
            sync: SyncConfig::default(),
            playback: PlaybackConfig::default(),
            smooth: SmoothMoveConfig::default(),
            timeouts: None,
        }
    }
}

impl TeachConfig {
    /// 初始速度（已限幅和量化）
    pub fn speed(&self) -> SpeedSetting {
        SpeedSetting::from_percent(self.speed_percent)
    }

    /// 执行器超时设置
    pub fn actuator_timeouts(&self) -> ActuatorTimeouts {
        self.timeouts
            .map(|t| t.to_timeouts())
            .unwrap_or(ActuatorTimeouts::NONE)
    }

    /// 检查配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed_percent.is_finite() {
            return Err(invalid("speed_percent must be a finite number"));
        }
        if self.sync.interval_ms == 0 {
            return Err(invalid("sync.interval_ms must be positive"));
        }
        if self.playback.pause_poll_ms == 0 {
            return Err(invalid("playback.pause_poll_ms must be positive"));
        }
        if self.smooth.steps == 0 {
            return Err(invalid("smooth.steps must be at least 1"));
        }
        if !(self.smooth.duration_secs.is_finite() && self.smooth.duration_secs > 0.0) {
            return Err(invalid("smooth.duration_secs must be positive"));
        }
        if let Some(timeouts) = &self.timeouts {
            let values = [timeouts.query_ms, timeouts.command_ms, timeouts.motion_ms];
            if values.iter().flatten().any(|&ms| ms == 0) {
                return Err(invalid("timeouts must be positive"));
            }
        }
        Ok(())
    }

    /// 从 TOML 字符串解析并检查
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TeachConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 文件存在时加载，否则返回默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 保存到文件（自动创建父目录）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_toml_string()?).map_err(io_err)
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TeachConfig::default();
        assert_eq!(config.speed().percent(), 20.0);
        assert_eq!(config.sync.interval(), Duration::from_millis(200));
        assert_eq!(config.playback.pause_poll(), Duration::from_millis(200));
        assert_eq!(config.smooth.step_delay(), Duration::from_millis(50));
        assert_eq!(config.actuator_timeouts(), ActuatorTimeouts::NONE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TeachConfig::from_toml_str(
            r#"
            [sync]
            policy = "suspend_during_playback"

            [smooth]
            on_step_failure = "abort"
            "#,
        )
        .unwrap();

        assert_eq!(config.sync.policy, SyncPolicy::SuspendDuringPlayback);
        assert_eq!(config.sync.interval_ms, 200);
        assert_eq!(config.smooth.on_step_failure, StepFailurePolicy::Abort);
        assert_eq!(config.smooth.steps, 20);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = TeachConfig {
            speed_percent: 42.5,
            timeouts: Some(TimeoutConfig {
                query_ms: Some(500),
                command_ms: None,
                motion_ms: Some(30_000),
            }),
            ..TeachConfig::default()
        };

        let text = config.to_toml_string().unwrap();
        let parsed = TeachConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);

        let timeouts = parsed.actuator_timeouts();
        assert_eq!(timeouts.query, Some(Duration::from_millis(500)));
        assert_eq!(timeouts.command, None);
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let err = TeachConfig::from_toml_str("[smooth]\nsteps = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_validate_rejects_non_positive_duration() {
        assert!(TeachConfig::from_toml_str("[smooth]\nduration_secs = 0.0\n").is_err());
        assert!(TeachConfig::from_toml_str("[smooth]\nduration_secs = -1.0\n").is_err());
    }

    #[test]
    fn test_validate_rejects_infinite_duration() {
        let config = TeachConfig {
            smooth: SmoothMoveConfig {
                duration_secs: f64::INFINITY,
                ..SmoothMoveConfig::default()
            },
            ..TeachConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_step_delay_never_panics() {
        for duration_secs in [f64::INFINITY, f64::NAN, -1.0, 1e300] {
            let smooth = SmoothMoveConfig {
                steps: 1,
                duration_secs,
                ..SmoothMoveConfig::default()
            };
            assert_eq!(smooth.step_delay(), Duration::ZERO, "{duration_secs}");
        }
        let smooth = SmoothMoveConfig {
            steps: 0,
            ..SmoothMoveConfig::default()
        };
        assert_eq!(smooth.step_delay(), Duration::ZERO);
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err = TeachConfig::from_toml_str("[sync]\npolicy = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("teach.toml");

        assert_eq!(
            TeachConfig::load_or_default(&path).unwrap(),
            TeachConfig::default()
        );

        let config = TeachConfig {
            speed_percent: 55.0,
            ..TeachConfig::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(TeachConfig::load_from_file(&path).unwrap(), config);
    }
}
