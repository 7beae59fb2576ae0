//! 角度单位
//!
//! 使用 NewType 模式区分弧度与角度：执行器内部一律使用弧度，
//! 操作员界面（输入框、日志、点位列表）一律使用角度。
//!
//! # 示例
//!
//! ```rust
//! use jaka_types::{Deg, Rad};
//!
//! let angle = Deg(90.0).to_rad();
//! assert!((angle.0 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//!
//! // 类型安全：以下代码无法编译
//! // let _ = Rad(1.0) + Deg(1.0);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// 弧度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rad(pub f64);

impl Rad {
    /// 零弧度常量
    pub const ZERO: Self = Rad(0.0);

    /// 创建新的弧度值
    #[inline]
    pub const fn new(value: f64) -> Self {
        Rad(value)
    }

    /// 转换为角度
    #[inline]
    pub fn to_deg(self) -> Deg {
        Deg(self.0.to_degrees())
    }

    /// 获取原始值
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// 是否为有限值（非 NaN / 非无穷）
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Rad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

/// 角度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deg(pub f64);

impl Deg {
    /// 零角度常量
    pub const ZERO: Self = Deg(0.0);

    /// 创建新的角度值
    #[inline]
    pub const fn new(value: f64) -> Self {
        Deg(value)
    }

    /// 转换为弧度
    #[inline]
    pub fn to_rad(self) -> Rad {
        Rad(self.0.to_radians())
    }

    /// 获取原始值
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// 是否为有限值（非 NaN / 非无穷）
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Deg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 与面板显示保持一致：一位小数
        write!(f, "{:.1}°", self.0)
    }
}

macro_rules! impl_angle_ops {
    ($ty:ident) => {
        impl Add for $ty {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                $ty(self.0 + rhs.0)
            }
        }

        impl Sub for $ty {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                $ty(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f64) -> Self {
                $ty(self.0 * rhs)
            }
        }

        impl Div<f64> for $ty {
            type Output = Self;
            #[inline]
            fn div(self, rhs: f64) -> Self {
                $ty(self.0 / rhs)
            }
        }

        impl Neg for $ty {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                $ty(-self.0)
            }
        }
    };
}

impl_angle_ops!(Rad);
impl_angle_ops!(Deg);

impl From<Deg> for Rad {
    #[inline]
    fn from(deg: Deg) -> Self {
        deg.to_rad()
    }
}

impl From<Rad> for Deg {
    #[inline]
    fn from(rad: Rad) -> Self {
        rad.to_deg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg_to_rad() {
        let rad = Deg(180.0).to_rad();
        assert!((rad.0 - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_rad_to_deg() {
        let deg = Rad(std::f64::consts::FRAC_PI_2).to_deg();
        assert!((deg.0 - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_arithmetic() {
        assert_eq!(Deg(10.0) + Deg(5.0), Deg(15.0));
        assert_eq!(Deg(10.0) - Deg(5.0), Deg(5.0));
        assert_eq!(Deg(4.5) * 2.0, Deg(9.0));
        assert_eq!(Deg(9.0) / 2.0, Deg(4.5));
        assert_eq!(-Rad(1.0), Rad(-1.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Deg(12.345)), "12.3°");
        assert_eq!(format!("{}", Rad(1.0)), "1.0000 rad");
    }

    #[test]
    fn test_from_conversions() {
        let rad: Rad = Deg(90.0).into();
        let deg: Deg = rad.into();
        assert!((deg.0 - 90.0).abs() < 1e-12);
    }
}
