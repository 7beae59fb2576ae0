//! 笛卡尔空间位姿
//!
//! 末端位置（毫米）+ RPY 姿态（弧度），与执行器接口的 `CartesianPose` 对应。

use super::units::{Deg, Rad};
use std::fmt;

/// 末端位姿
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartesianPose {
    /// X 坐标（mm）
    pub x: f64,
    /// Y 坐标（mm）
    pub y: f64,
    /// Z 坐标（mm）
    pub z: f64,
    /// 绕 X 轴旋转
    pub rx: Rad,
    /// 绕 Y 轴旋转
    pub ry: Rad,
    /// 绕 Z 轴旋转
    pub rz: Rad,
}

impl CartesianPose {
    /// 创建新的位姿
    pub const fn new(x: f64, y: f64, z: f64, rx: Rad, ry: Rad, rz: Rad) -> Self {
        CartesianPose { x, y, z, rx, ry, rz }
    }

    /// 从位置（mm）和角度形式的姿态创建
    pub fn from_degrees(x: f64, y: f64, z: f64, rx: Deg, ry: Deg, rz: Deg) -> Self {
        CartesianPose::new(x, y, z, rx.to_rad(), ry.to_rad(), rz.to_rad())
    }

    /// 所有分量是否为有限值
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z, self.rx.0, self.ry.0, self.rz.0]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl fmt::Display for CartesianPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X={:.1}mm Y={:.1}mm Z={:.1}mm Rx={} Ry={} Rz={}",
            self.x,
            self.y,
            self.z,
            self.rx.to_deg(),
            self.ry.to_deg(),
            self.rz.to_deg()
        )
    }
}
