//! 测试共用的仿真环境

#![allow(dead_code)]

use jaka_actuator::{ActuatorSession, SimulatedActuator};
use jaka_teach::TaughtPoint;
use jaka_types::JointPose;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 已使能的会话
pub fn ready_session(sim: Arc<SimulatedActuator>) -> Arc<ActuatorSession> {
    let session = Arc::new(ActuatorSession::new(sim));
    session.connect("sim").unwrap();
    session.power_on().unwrap();
    session.enable().unwrap();
    session
}

/// 按关节 J1 的弧度值构造点位
pub fn point(name: &str, j1: f64, delay_secs: f64) -> TaughtPoint {
    TaughtPoint::new(
        name,
        JointPose::from_radians([j1, 0.0, 0.0, 0.0, 0.0, 0.0]),
        delay_secs,
    )
    .unwrap()
}

/// 轮询等待条件成立
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
