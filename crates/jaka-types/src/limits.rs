//! 关节限位校验
//!
//! 限位表为进程级常量（单位：度，闭区间）：
//!
//! | 关节 | 下限 | 上限 |
//! |------|------|------|
//! | J1   | -360 | 360  |
//! | J2   | -50  | 230  |
//! | J3   | -155 | 155  |
//! | J4   | -85  | 265  |
//! | J5   | -360 | 360  |
//! | J6   | -360 | 360  |
//!
//! 所有显式设定关节角度的指令（单关节移动、全关节移动）下发前都必须校验。
//! 平滑移动的中间插值点位于当前位置与已校验终点之间，不再重复校验。

use crate::error::ValidationError;
use crate::joint::{JOINT_COUNT, Joint, JointArray};
use crate::units::Deg;

/// 单个关节的限位（度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRange {
    /// 下限（度）
    pub min: f64,
    /// 上限（度）
    pub max: f64,
}

impl JointRange {
    /// 创建限位
    pub const fn new(min: f64, max: f64) -> Self {
        JointRange { min, max }
    }

    /// 是否在范围内（NaN 视为越界）
    #[inline]
    pub fn contains(&self, degrees: f64) -> bool {
        degrees >= self.min && degrees <= self.max
    }
}

/// 关节限位表
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    ranges: [JointRange; JOINT_COUNT],
}

/// JAKA 六轴机械臂的关节限位
pub const JAKA_JOINT_LIMITS: JointLimits = JointLimits::new([
    JointRange::new(-360.0, 360.0),
    JointRange::new(-50.0, 230.0),
    JointRange::new(-155.0, 155.0),
    JointRange::new(-85.0, 265.0),
    JointRange::new(-360.0, 360.0),
    JointRange::new(-360.0, 360.0),
]);

impl Default for JointLimits {
    fn default() -> Self {
        JAKA_JOINT_LIMITS
    }
}

impl JointLimits {
    /// 创建限位表
    pub const fn new(ranges: [JointRange; JOINT_COUNT]) -> Self {
        JointLimits { ranges }
    }

    /// 获取某个关节的限位
    #[inline]
    pub fn range(&self, joint: Joint) -> JointRange {
        self.ranges[joint.index()]
    }

    /// 校验单个关节
    pub fn check(&self, joint: Joint, value: Deg) -> Result<(), ValidationError> {
        let range = self.range(joint);
        if range.contains(value.0) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                joint,
                value: value.0,
                min: range.min,
                max: range.max,
            })
        }
    }

    /// 按操作员编号（1-6）校验
    ///
    /// # 错误
    ///
    /// - 编号不在 1..=6：[`ValidationError::InvalidJoint`]
    /// - 角度越界：[`ValidationError::OutOfRange`]
    pub fn validate(&self, joint_number: usize, value: Deg) -> Result<(), ValidationError> {
        let joint =
            Joint::from_number(joint_number).ok_or(ValidationError::InvalidJoint(joint_number))?;
        self.check(joint, value)
    }

    /// 校验全部 6 个关节，返回第一个违规项
    pub fn validate_pose(&self, targets: &JointArray<Deg>) -> Result<(), ValidationError> {
        Joint::ALL
            .iter()
            .try_for_each(|&joint| self.check(joint, targets[joint]))
    }
}

/// 使用默认限位表校验（1 起始编号）
pub fn validate(joint_number: usize, value: Deg) -> Result<(), ValidationError> {
    JAKA_JOINT_LIMITS.validate(joint_number, value)
}

/// 点位延时上限（秒）
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// 校验点位延时（NaN 视为无效）
pub fn validate_delay(delay_secs: f64) -> Result<(), ValidationError> {
    if (0.0..=MAX_DELAY_SECS).contains(&delay_secs) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDelay(delay_secs))
    }
}

/// 解析操作员输入的角度
///
/// 仅做数字解析，不做限位校验。
pub fn parse_degrees(joint: Joint, input: &str) -> Result<Deg, ValidationError> {
    input
        .trim()
        .parse::<f64>()
        .map(Deg)
        .map_err(|_| ValidationError::NotANumber {
            joint,
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bounds_inclusive() {
        for joint in Joint::ALL {
            let range = JAKA_JOINT_LIMITS.range(joint);
            assert!(JAKA_JOINT_LIMITS.check(joint, Deg(range.min)).is_ok());
            assert!(JAKA_JOINT_LIMITS.check(joint, Deg(range.max)).is_ok());
        }
    }

    #[test]
    fn test_j2_out_of_range_reports_bounds() {
        let err = validate(2, Deg(230.5)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                joint: Joint::J2,
                value: 230.5,
                min: -50.0,
                max: 230.0,
            }
        );
    }

    #[test]
    fn test_invalid_joint_number() {
        assert_eq!(validate(0, Deg(0.0)), Err(ValidationError::InvalidJoint(0)));
        assert_eq!(validate(7, Deg(0.0)), Err(ValidationError::InvalidJoint(7)));
    }

    #[test]
    fn test_nan_rejected() {
        assert!(validate(1, Deg(f64::NAN)).is_err());
        assert!(validate(1, Deg(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_validate_pose_reports_first_violation() {
        let targets = JointArray::new([
            Deg(0.0),
            Deg(0.0),
            Deg(200.0),
            Deg(-90.0),
            Deg(0.0),
            Deg(0.0),
        ]);
        let err = JAKA_JOINT_LIMITS.validate_pose(&targets).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { joint: Joint::J3, .. }));
    }

    #[test]
    fn test_validate_delay_bounds() {
        assert!(validate_delay(0.0).is_ok());
        assert!(validate_delay(MAX_DELAY_SECS).is_ok());
        assert_eq!(validate_delay(-0.5), Err(ValidationError::InvalidDelay(-0.5)));
        assert!(validate_delay(MAX_DELAY_SECS + 1.0).is_err());
        assert!(validate_delay(1e20).is_err());
        assert!(validate_delay(f64::INFINITY).is_err());
        assert!(validate_delay(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_degrees() {
        assert_eq!(parse_degrees(Joint::J1, " 12.5 "), Ok(Deg(12.5)));
        assert!(matches!(
            parse_degrees(Joint::J4, "12,5"),
            Err(ValidationError::NotANumber { joint: Joint::J4, .. })
        ));
    }

    fn joint_and_range() -> impl Strategy<Value = (usize, JointRange)> {
        (1usize..=6).prop_map(|n| {
            let joint = Joint::from_number(n).unwrap();
            (n, JAKA_JOINT_LIMITS.range(joint))
        })
    }

    proptest! {
        /// 范围内的角度总是通过
        #[test]
        fn in_range_accepted((n, range) in joint_and_range(), t in 0.0..=1.0f64) {
            let value = range.min + (range.max - range.min) * t;
            prop_assert!(validate(n, Deg(value)).is_ok());
        }

        /// 范围外的角度总是被拒绝，且携带正确的限位
        #[test]
        fn out_of_range_rejected((n, range) in joint_and_range(), excess in 0.001..1000.0f64, above in any::<bool>()) {
            let value = if above { range.max + excess } else { range.min - excess };
            match validate(n, Deg(value)) {
                Err(ValidationError::OutOfRange { joint, min, max, .. }) => {
                    prop_assert_eq!(joint.number(), n);
                    prop_assert_eq!(min, range.min);
                    prop_assert_eq!(max, range.max);
                },
                other => prop_assert!(false, "unexpected verdict: {:?}", other),
            }
        }
    }
}
