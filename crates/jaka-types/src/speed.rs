//! 速度设定
//!
//! 操作员以百分比设定速度：先限制到 [5, 100]，再量化到 0.25 的整数倍，
//! 最后换算为执行器使用的比例 [0.05, 1.0]（即 0.0025 的整数倍）。
//!
//! [`SharedSpeed`] 是可跨线程共享的原子版本：序列回放在每次下发移动指令前读取，
//! 因此回放过程中调整速度会在下一个点位生效。

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// 速度下限（%）
pub const MIN_SPEED_PERCENT: f64 = 5.0;
/// 速度上限（%）
pub const MAX_SPEED_PERCENT: f64 = 100.0;
/// 量化步长（%）
pub const SPEED_STEP_PERCENT: f64 = 0.25;
/// 默认速度（%）
pub const DEFAULT_SPEED_PERCENT: f64 = 20.0;

/// 量化后的速度设定
///
/// 内部以 0.25% 为单位的整数存储，保证量化结果精确。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeedSetting {
    quarter_steps: u32,
}

impl SpeedSetting {
    /// 最低速度
    pub const MIN: Self = SpeedSetting { quarter_steps: 20 };
    /// 最高速度
    pub const MAX: Self = SpeedSetting { quarter_steps: 400 };

    /// 从百分比创建（自动限幅和量化）
    ///
    /// 量化采用“四舍六入五成双”，NaN 视为最低速度。
    pub fn from_percent(percent: f64) -> Self {
        if percent.is_nan() {
            return Self::MIN;
        }
        let clamped = percent.clamp(MIN_SPEED_PERCENT, MAX_SPEED_PERCENT);
        let steps = (clamped / SPEED_STEP_PERCENT).round_ties_even();
        SpeedSetting {
            quarter_steps: steps as u32,
        }
    }

    /// 量化后的百分比
    #[inline]
    pub fn percent(self) -> f64 {
        self.quarter_steps as f64 * SPEED_STEP_PERCENT
    }

    /// 执行器速度比例 [0.05, 1.0]
    #[inline]
    pub fn ratio(self) -> f64 {
        self.percent() / 100.0
    }

    /// 直线运动速度（mm/s），与比例成正比，满速为 100 mm/s
    #[inline]
    pub fn linear_velocity(self) -> f64 {
        100.0 * self.ratio()
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        SpeedSetting::from_percent(DEFAULT_SPEED_PERCENT)
    }
}

impl fmt::Display for SpeedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}%", self.percent())
    }
}

/// 可共享的速度设定（原子版本）
#[derive(Debug)]
pub struct SharedSpeed {
    quarter_steps: AtomicU32,
}

impl SharedSpeed {
    /// 创建新的共享速度
    pub fn new(speed: SpeedSetting) -> Self {
        SharedSpeed {
            quarter_steps: AtomicU32::new(speed.quarter_steps),
        }
    }

    /// 读取当前设定
    pub fn get(&self) -> SpeedSetting {
        SpeedSetting {
            quarter_steps: self.quarter_steps.load(Ordering::Relaxed),
        }
    }

    /// 更新设定
    pub fn set(&self, speed: SpeedSetting) {
        self.quarter_steps.store(speed.quarter_steps, Ordering::Relaxed);
    }

    /// 当前速度比例
    pub fn ratio(&self) -> f64 {
        self.get().ratio()
    }
}

impl Default for SharedSpeed {
    fn default() -> Self {
        SharedSpeed::new(SpeedSetting::default())
    }
}
