//! 关节索引和数组
//!
//! JAKA 六轴机械臂的关节位姿固定为 6 个角度，索引与物理关节一一对应。
//! 操作员界面使用 1 起始的关节编号（J1..J6），内部使用 0 起始的数组索引。
//!
//! # 示例
//!
//! ```rust
//! use jaka_types::{Deg, Joint, JointArray, JointPose, Rad};
//!
//! let pose: JointPose = JointArray::new([Rad(0.0), Rad(0.1), Rad(0.2), Rad(0.3), Rad(0.4), Rad(0.5)]);
//! assert_eq!(pose[Joint::J2], Rad(0.1));
//!
//! // 只替换一个关节
//! let moved = pose.with(Joint::J3, Deg(45.0).to_rad());
//! assert_eq!(moved[Joint::J1], pose[Joint::J1]);
//! ```

use super::units::{Deg, Rad};
use std::fmt;
use std::ops::{Index, IndexMut};

/// 关节数量
pub const JOINT_COUNT: usize = 6;

/// 关节枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Joint {
    /// 关节 1（基座旋转）
    J1 = 0,
    /// 关节 2（肩部）
    J2 = 1,
    /// 关节 3（肘部）
    J3 = 2,
    /// 关节 4（腕部 1）
    J4 = 3,
    /// 关节 5（腕部 2）
    J5 = 4,
    /// 关节 6（末端旋转）
    J6 = 5,
}

impl Joint {
    /// 所有关节的数组
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::J1,
        Joint::J2,
        Joint::J3,
        Joint::J4,
        Joint::J5,
        Joint::J6,
    ];

    /// 获取关节索引（0-5）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 获取关节编号（1-6）
    #[inline]
    pub const fn number(self) -> usize {
        self as usize + 1
    }

    /// 从索引创建关节（0-5）
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 从操作员编号创建关节（1-6）
    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).and_then(Self::from_index)
    }

    /// 获取关节名称
    pub const fn name(self) -> &'static str {
        match self {
            Joint::J1 => "J1",
            Joint::J2 => "J2",
            Joint::J3 => "J3",
            Joint::J4 => "J4",
            Joint::J5 => "J5",
            Joint::J6 => "J6",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 关节数组
///
/// 固定 6 元素的容器，长度在类型层面保证。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointArray<T> {
    data: [T; JOINT_COUNT],
}

impl<T: Copy> Copy for JointArray<T> {}

impl<T> JointArray<T> {
    /// 创建新的关节数组
    #[inline]
    pub const fn new(data: [T; JOINT_COUNT]) -> Self {
        JointArray { data }
    }

    /// 获取内部数组的引用
    #[inline]
    pub fn as_array(&self) -> &[T; JOINT_COUNT] {
        &self.data
    }

    /// 获取内部数组（消耗 self）
    #[inline]
    pub fn into_array(self) -> [T; JOINT_COUNT] {
        self.data
    }

    /// 迭代器
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// 映射转换
    pub fn map<U, F>(self, f: F) -> JointArray<U>
    where
        F: FnMut(T) -> U,
    {
        JointArray::new(self.data.map(f))
    }
}

impl<T: Copy> JointArray<T> {
    /// 创建所有元素相同的数组
    #[inline]
    pub const fn splat(value: T) -> Self {
        JointArray::new([value; JOINT_COUNT])
    }

    /// 返回只替换了一个关节的新数组
    #[inline]
    pub fn with(mut self, joint: Joint, value: T) -> Self {
        self.data[joint.index()] = value;
        self
    }
}

impl<T: Default + Copy> Default for JointArray<T> {
    fn default() -> Self {
        JointArray::splat(T::default())
    }
}

impl<T> Index<Joint> for JointArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, joint: Joint) -> &T {
        &self.data[joint.index()]
    }
}

impl<T> IndexMut<Joint> for JointArray<T> {
    #[inline]
    fn index_mut(&mut self, joint: Joint) -> &mut T {
        &mut self.data[joint.index()]
    }
}

impl<T> Index<usize> for JointArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> From<[T; JOINT_COUNT]> for JointArray<T> {
    #[inline]
    fn from(data: [T; JOINT_COUNT]) -> Self {
        JointArray::new(data)
    }
}

impl<T> IntoIterator for JointArray<T> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, JOINT_COUNT>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a JointArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// 关节位姿（弧度）
pub type JointPose = JointArray<Rad>;

impl JointArray<Rad> {
    /// 零位（Home）
    pub const HOME: Self = JointArray::splat(Rad::ZERO);

    /// 转换为角度表示（用于显示）
    pub fn to_degrees(self) -> JointArray<Deg> {
        self.map(Rad::to_deg)
    }

    /// 从原始弧度数组创建
    pub fn from_radians(values: [f64; JOINT_COUNT]) -> Self {
        JointArray::new(values.map(Rad))
    }

    /// 原始弧度数组
    pub fn radians(&self) -> [f64; JOINT_COUNT] {
        self.data.map(|r| r.0)
    }
}

impl JointArray<Deg> {
    /// 转换为弧度表示（用于下发）
    pub fn to_radians(self) -> JointPose {
        self.map(Deg::to_rad)
    }
}

impl fmt::Display for JointArray<Deg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, deg) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{deg}")?;
        }
        f.write_str(")")
    }
}
