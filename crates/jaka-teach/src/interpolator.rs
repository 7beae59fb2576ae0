//! 单关节平滑移动
//!
//! 在角度空间对单个关节做线性插值，把一次大角度移动拆成若干次小的阻塞移动：
//!
//! ```text
//! step = (target - current) / steps
//! k = 1..=steps:  current + step * k     （最后一步精确等于 target）
//! ```
//!
//! 每一步只替换目标关节，其余关节保持起始读取时的位置；
//! 每一步移动完成后再等待 `duration / steps`。
//!
//! 路径生成（[`SmoothPath`]）是纯迭代器，执行（[`smooth_move`]）依赖执行器。
//! 中间点位于当前位置和已校验的终点之间，不再重复做限位校验。

use crate::config::{SmoothMoveConfig, StepFailurePolicy};
use crate::error::MotionError;
use jaka_actuator::{ActuatorError, MotionActuator, MoveMode};
use jaka_types::{Deg, Joint, SharedSpeed};
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, warn};

/// 单关节线性路径
///
/// 产生 `steps` 个角度值，严格落在起点（不含）和终点（含）之间。
#[derive(Debug, Clone)]
pub struct SmoothPath {
    start: f64,
    target: f64,
    step: f64,
    steps: u32,
    next_index: u32,
}

impl SmoothPath {
    /// 创建路径
    ///
    /// `steps` 为 0 时路径为空。
    pub fn new(start: Deg, target: Deg, steps: u32) -> Self {
        let step = if steps == 0 {
            0.0
        } else {
            (target.0 - start.0) / steps as f64
        };
        Self {
            start: start.0,
            target: target.0,
            step,
            steps,
            next_index: 1,
        }
    }

    /// 每一步的角度增量
    pub fn step_size(&self) -> Deg {
        Deg(self.step)
    }
}

impl Iterator for SmoothPath {
    type Item = Deg;

    fn next(&mut self) -> Option<Deg> {
        if self.next_index > self.steps {
            return None;
        }
        let k = self.next_index;
        self.next_index += 1;

        if k == self.steps {
            Some(Deg(self.target))
        } else {
            Some(Deg(self.start + self.step * k as f64))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1 - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SmoothPath {}

impl FusedIterator for SmoothPath {}

/// 平滑移动结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothMoveReport {
    /// 成功执行的步数
    pub steps_completed: u32,
    /// 失败的步数
    pub steps_failed: u32,
    /// 是否被取消
    pub cancelled: bool,
    /// 最后一次失败
    pub last_error: Option<ActuatorError>,
}

impl SmoothMoveReport {
    /// 所有步骤都成功且未被取消
    pub fn is_clean(&self) -> bool {
        self.steps_failed == 0 && !self.cancelled
    }
}

/// 执行单关节平滑移动
///
/// # 参数
///
/// - `target`: 目标角度（调用方负责限位校验）
/// - `speed`: 每一步下发前读取的速度
/// - `cancel`: 每一步之前检查，置位后立即返回
///
/// # 错误
///
/// - 读取起始位置失败：[`MotionError::Actuator`]，不下发任何移动
/// - `StepFailurePolicy::Abort` 下某一步失败：[`MotionError::StepFailed`]
///
/// `StepFailurePolicy::Continue` 下的失败只记录在报告中。
pub fn smooth_move(
    actuator: &dyn MotionActuator,
    joint: Joint,
    target: Deg,
    speed: &SharedSpeed,
    config: &SmoothMoveConfig,
    cancel: &AtomicBool,
) -> Result<SmoothMoveReport, MotionError> {
    let base = actuator.joint_pose()?;
    let start = base[joint].to_deg();
    let step_delay = config.step_delay();
    let path = SmoothPath::new(start, target, config.steps);

    debug!(
        "Smooth move {}: {} -> {} in {} steps",
        joint, start, target, config.steps
    );

    let mut report = SmoothMoveReport::default();
    for (i, deg) in path.enumerate() {
        let step = i as u32 + 1;
        if cancel.load(Ordering::Acquire) {
            debug!("Smooth move {} cancelled before step {}", joint, step);
            report.cancelled = true;
            break;
        }

        let pose = base.with(joint, deg.to_rad());
        match actuator.move_joint(&pose, MoveMode::Absolute, true, speed.ratio()) {
            Ok(()) => report.steps_completed += 1,
            Err(e) => {
                warn!("Smooth move {} step {} failed: {}", joint, step, e);
                report.steps_failed += 1;
                if config.on_step_failure == StepFailurePolicy::Abort {
                    return Err(MotionError::StepFailed { step, source: e });
                }
                report.last_error = Some(e);
            },
        }

        if !step_delay.is_zero() {
            thread::sleep(step_delay);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaka_actuator::{SimMove, SimulatedActuator};
    use jaka_types::JointPose;
    use proptest::prelude::*;

    fn fast_config() -> SmoothMoveConfig {
        SmoothMoveConfig {
            steps: 20,
            duration_secs: 0.001,
            on_step_failure: StepFailurePolicy::Continue,
        }
    }

    #[test]
    fn test_zero_to_ninety() {
        let path = SmoothPath::new(Deg(0.0), Deg(90.0), 20);
        assert_eq!(path.len(), 20);
        assert_eq!(path.step_size(), Deg(4.5));

        let values: Vec<f64> = path.map(|d| d.0).collect();
        assert_eq!(values.len(), 20);
        assert_eq!(values[0], 4.5);
        assert_eq!(values[19], 90.0);
        assert!(values.windows(2).all(|w| w[1] > w[0]));
        for w in values.windows(2) {
            assert!((w[1] - w[0] - 4.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_steps_is_empty() {
        assert_eq!(SmoothPath::new(Deg(0.0), Deg(10.0), 0).count(), 0);
    }

    #[test]
    fn test_same_start_and_target() {
        let values: Vec<Deg> = SmoothPath::new(Deg(12.0), Deg(12.0), 4).collect();
        assert_eq!(values, vec![Deg(12.0); 4]);
    }

    #[test]
    fn test_smooth_move_replaces_only_target_joint() {
        let start = JointPose::from_radians([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let sim = SimulatedActuator::ready().with_joints(start);
        let speed = SharedSpeed::default();
        let cancel = AtomicBool::new(false);

        let report =
            smooth_move(&sim, Joint::J3, Deg(30.0), &speed, &fast_config(), &cancel).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.steps_completed, 20);

        let moves = sim.moves();
        assert_eq!(moves.len(), 20);
        for mv in &moves {
            let SimMove::Joint { target, speed } = mv else {
                panic!("unexpected move {mv:?}");
            };
            assert_eq!(*speed, 0.2);
            assert_eq!(target[Joint::J1], start[Joint::J1]);
            assert_eq!(target[Joint::J6], start[Joint::J6]);
        }
        let last = sim.joints();
        assert!((last[Joint::J3].to_deg().0 - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_initial_read_failure_reported() {
        let sim = SimulatedActuator::ready();
        sim.set_fail_reads(true);

        let err = smooth_move(
            &sim,
            Joint::J1,
            Deg(10.0),
            &SharedSpeed::default(),
            &fast_config(),
            &AtomicBool::new(false),
        )
        .unwrap_err();
        assert!(matches!(err, MotionError::Actuator(_)));
        assert_eq!(sim.move_attempts(), 0);
    }

    #[test]
    fn test_step_failure_continue() {
        let sim = SimulatedActuator::ready();
        sim.fail_move_at(3, -9);

        let report = smooth_move(
            &sim,
            Joint::J1,
            Deg(10.0),
            &SharedSpeed::default(),
            &fast_config(),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(report.steps_completed, 19);
        assert_eq!(report.steps_failed, 1);
        assert_eq!(report.last_error.and_then(|e| e.status_code()), Some(-9));
    }

    #[test]
    fn test_step_failure_abort() {
        let sim = SimulatedActuator::ready();
        sim.fail_move_at(3, -9);
        let config = SmoothMoveConfig {
            on_step_failure: StepFailurePolicy::Abort,
            ..fast_config()
        };

        let err = smooth_move(
            &sim,
            Joint::J1,
            Deg(10.0),
            &SharedSpeed::default(),
            &config,
            &AtomicBool::new(false),
        )
        .unwrap_err();
        assert!(matches!(err, MotionError::StepFailed { step: 4, .. }));
        assert_eq!(sim.move_attempts(), 4);
    }

    #[test]
    fn test_cancel_before_first_step() {
        let sim = SimulatedActuator::ready();
        let report = smooth_move(
            &sim,
            Joint::J1,
            Deg(10.0),
            &SharedSpeed::default(),
            &fast_config(),
            &AtomicBool::new(true),
        )
        .unwrap();
        assert!(report.cancelled);
        assert_eq!(sim.move_attempts(), 0);
    }

    proptest! {
        /// 路径长度等于步数，最后一个值精确等于终点
        #[test]
        fn path_ends_at_target(start in -360.0..360.0f64, target in -360.0..360.0f64, steps in 1u32..100) {
            let values: Vec<Deg> = SmoothPath::new(Deg(start), Deg(target), steps).collect();
            prop_assert_eq!(values.len(), steps as usize);
            prop_assert_eq!(values[values.len() - 1], Deg(target));
        }

        /// 路径单调，且不超出起点和终点之间
        #[test]
        fn path_monotonic_and_bounded(start in -360.0..360.0f64, target in -360.0..360.0f64, steps in 1u32..100) {
            let (lo, hi) = if start <= target { (start, target) } else { (target, start) };
            let values: Vec<f64> = SmoothPath::new(Deg(start), Deg(target), steps).map(|d| d.0).collect();
            for v in &values {
                prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
            }
            for w in values.windows(2) {
                if target >= start {
                    prop_assert!(w[1] >= w[0] - 1e-9);
                } else {
                    prop_assert!(w[1] <= w[0] + 1e-9);
                }
            }
        }
    }
}
