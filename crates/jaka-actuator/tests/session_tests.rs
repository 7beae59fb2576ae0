//! 会话状态转换测试

use jaka_actuator::{
    ActuatorError, ActuatorSession, MotionActuator, MoveMode, SessionState, SimulatedActuator,
};
use jaka_types::JointPose;
use std::sync::Arc;

fn session() -> (Arc<SimulatedActuator>, ActuatorSession) {
    let sim = Arc::new(SimulatedActuator::new());
    let session = ActuatorSession::new(sim.clone());
    (sim, session)
}

#[test]
fn test_full_bring_up() {
    let (sim, session) = session();
    assert_eq!(session.state(), SessionState::Disconnected);

    assert_eq!(session.connect("10.5.5.100").unwrap(), SessionState::Connected);
    assert_eq!(session.power_on().unwrap(), SessionState::Powered);
    assert_eq!(session.enable().unwrap(), SessionState::Enabled);
    assert!(session.is_ready());

    sim.move_joint(&JointPose::HOME, MoveMode::Absolute, true, 0.2)
        .unwrap();
    assert_eq!(sim.move_count(), 1);
}

#[test]
fn test_operations_require_connection() {
    let (_sim, session) = session();
    assert_eq!(session.power_on(), Err(ActuatorError::NotConnected));
    assert_eq!(session.enable(), Err(ActuatorError::NotConnected));
    assert_eq!(session.shutdown(), Err(ActuatorError::NotConnected));
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn test_failed_call_keeps_state() {
    let (_sim, session) = session();
    session.connect("sim").unwrap();

    // 未上电时使能失败
    assert!(session.enable().is_err());
    assert_eq!(session.state(), SessionState::Connected);

    assert!(session.connect("").is_err());
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_disable_and_power_off() {
    let (_sim, session) = session();
    session.connect("sim").unwrap();
    session.power_on().unwrap();
    session.enable().unwrap();

    assert_eq!(session.disable().unwrap(), SessionState::Powered);
    assert!(!session.is_ready());

    session.enable().unwrap();
    assert_eq!(session.power_off().unwrap(), SessionState::Connected);
    assert!(session.is_connected());
}

#[test]
fn test_power_on_while_enabled_keeps_enabled() {
    let (_sim, session) = session();
    session.connect("sim").unwrap();
    session.power_on().unwrap();
    session.enable().unwrap();

    assert_eq!(session.power_on().unwrap(), SessionState::Enabled);
}

#[test]
fn test_shutdown_disconnects() {
    let (sim, session) = session();
    session.connect("sim").unwrap();
    session.power_on().unwrap();
    session.enable().unwrap();

    assert_eq!(session.shutdown().unwrap(), SessionState::Disconnected);
    assert_eq!(sim.joint_pose(), Err(ActuatorError::NotConnected));
}
