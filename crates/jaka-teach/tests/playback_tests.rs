//! 序列回放集成测试

mod common;

use common::{point, ready_session, wait_until};
use jaka_actuator::{ActuatorSession, SimulatedActuator};
use jaka_teach::{
    EventSink, LoopTarget, PlaybackConfig, PlaybackError, PlaybackEvent, PlaybackOutcome,
    PlaybackState, PointStore, SequencePlayer, StoreError, TeachEvent,
};
use jaka_types::{MAX_DELAY_SECS, SharedSpeed, SpeedSetting};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn fast_config() -> PlaybackConfig {
    PlaybackConfig { pause_poll_ms: 10 }
}

fn player(sim: &Arc<SimulatedActuator>) -> SequencePlayer {
    SequencePlayer::new(
        ready_session(sim.clone()),
        Arc::new(SharedSpeed::default()),
        fast_config(),
        EventSink::discard(),
    )
}

#[test]
fn test_three_loops_of_two_points() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = player(&sim);

    player
        .start(vec![point("A", 0.1, 0.0), point("B", 0.2, 0.0)], LoopTarget::Count(3))
        .unwrap();
    let summary = player.wait().unwrap();

    assert_eq!(summary.outcome, PlaybackOutcome::Completed);
    assert_eq!(summary.loops_completed, 3);
    assert_eq!(summary.moves_ok, 6);
    assert_eq!(summary.moves_failed, 0);
    assert_eq!(sim.move_count(), 6);
    assert_eq!(player.state(), PlaybackState::Idle);
    assert_eq!(player.snapshot().loop_index, 3);
}

#[test]
fn test_moves_follow_insertion_order() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = player(&sim);
    let points = vec![point("A", 0.1, 0.0), point("B", 0.2, 0.0), point("C", 0.3, 0.0)];

    player.start(points.clone(), LoopTarget::Count(1)).unwrap();
    player.wait().unwrap();

    let moves = sim.moves();
    assert_eq!(moves.len(), 3);
    for (mv, expected) in moves.iter().zip(&points) {
        match mv {
            jaka_actuator::SimMove::Joint { target, speed } => {
                assert_eq!(target, expected.pose());
                assert_eq!(*speed, 0.2);
            },
            other => panic!("unexpected move {other:?}"),
        }
    }
}

#[test]
fn test_failed_point_does_not_abort() {
    let sim = Arc::new(SimulatedActuator::new());
    sim.fail_move_at(1, -3);
    let player = player(&sim);

    player
        .start(vec![point("A", 0.1, 0.0), point("B", 0.2, 0.0)], LoopTarget::Count(2))
        .unwrap();
    let summary = player.wait().unwrap();

    assert_eq!(summary.outcome, PlaybackOutcome::Completed);
    assert_eq!(summary.loops_completed, 2);
    assert_eq!(summary.moves_ok, 3);
    assert_eq!(summary.moves_failed, 1);
}

#[test]
fn test_start_rejections() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = player(&sim);

    assert!(matches!(
        player.start(Vec::new(), LoopTarget::Count(1)),
        Err(PlaybackError::NoPoints)
    ));
    assert!(matches!(
        player.start(vec![point("A", 0.0, 0.0)], LoopTarget::Count(0)),
        Err(PlaybackError::InvalidLoopCount(0))
    ));

    let idle_session = Arc::new(ActuatorSession::new(Arc::new(SimulatedActuator::new())));
    let not_ready = SequencePlayer::new(
        idle_session,
        Arc::new(SharedSpeed::default()),
        fast_config(),
        EventSink::discard(),
    );
    assert!(matches!(
        not_ready.start(vec![point("A", 0.0, 0.0)], LoopTarget::Count(1)),
        Err(PlaybackError::NotReady)
    ));
    assert_eq!(sim.move_attempts(), 0);
}

#[test]
fn test_already_running() {
    let sim = Arc::new(SimulatedActuator::new().with_move_duration(Duration::from_millis(10)));
    let player = player(&sim);

    player
        .start(vec![point("A", 0.1, 0.0)], LoopTarget::Infinite)
        .unwrap();
    assert!(matches!(
        player.start(vec![point("A", 0.1, 0.0)], LoopTarget::Count(1)),
        Err(PlaybackError::AlreadyRunning)
    ));

    assert!(player.stop());
    assert_eq!(player.wait().unwrap().outcome, PlaybackOutcome::Stopped);

    // 结束后可以再次启动
    player
        .start(vec![point("A", 0.1, 0.0)], LoopTarget::Count(1))
        .unwrap();
    assert_eq!(player.wait().unwrap().outcome, PlaybackOutcome::Completed);
}

#[test]
fn test_pause_halts_until_resume() {
    let sim = Arc::new(SimulatedActuator::new().with_move_duration(Duration::from_millis(10)));
    let player = player(&sim);

    player
        .start(vec![point("A", 0.1, 0.0), point("B", 0.2, 0.0)], LoopTarget::Infinite)
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || sim.move_count() >= 2));

    assert!(player.pause());
    assert!(!player.pause());
    assert!(player.snapshot().paused());

    // 等待进行中的移动结束
    thread::sleep(Duration::from_millis(50));
    let frozen = sim.move_count();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(sim.move_count(), frozen);

    assert!(player.resume());
    assert!(wait_until(Duration::from_secs(2), || sim.move_count() > frozen));

    player.stop();
    player.wait().unwrap();
}

#[test]
fn test_stop_while_paused_releases_wait() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = SequencePlayer::new(
        ready_session(sim.clone()),
        Arc::new(SharedSpeed::default()),
        PlaybackConfig { pause_poll_ms: 200 },
        EventSink::discard(),
    );

    player
        .start(vec![point("A", 0.1, 0.05)], LoopTarget::Infinite)
        .unwrap();
    assert!(player.pause());

    let started = Instant::now();
    assert!(player.stop());
    let summary = player.wait().unwrap();
    assert_eq!(summary.outcome, PlaybackOutcome::Stopped);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(player.state(), PlaybackState::Idle);
}

#[test]
fn test_stop_interrupts_long_delay() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = player(&sim);

    player
        .start(vec![point("A", 0.1, 30.0), point("B", 0.2, 0.0)], LoopTarget::Count(1))
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || sim.move_count() == 1));

    let started = Instant::now();
    player.stop();
    let summary = player.wait().unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(summary.outcome, PlaybackOutcome::Stopped);
    assert_eq!(summary.loops_completed, 0);
    // 停止在点位边界生效，B 不会被执行
    assert_eq!(sim.move_count(), 1);
}

#[test]
fn test_stop_when_idle_is_noop() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = player(&sim);
    assert!(!player.stop());
    assert!(!player.resume());
    assert!(player.wait().is_none());
}

#[test]
fn test_speed_read_per_move() {
    let sim = Arc::new(SimulatedActuator::new());
    let speed = Arc::new(SharedSpeed::new(SpeedSetting::from_percent(50.0)));
    let player = SequencePlayer::new(
        ready_session(sim.clone()),
        speed,
        fast_config(),
        EventSink::discard(),
    );

    player
        .start(vec![point("A", 0.1, 0.0)], LoopTarget::Count(2))
        .unwrap();
    player.wait().unwrap();

    assert!(sim.moves().iter().all(|m| m.speed() == 0.5));
}

#[test]
fn test_event_sequence() {
    let sim = Arc::new(SimulatedActuator::new());
    let (events, rx) = EventSink::channel();
    let player = SequencePlayer::new(
        ready_session(sim.clone()),
        Arc::new(SharedSpeed::default()),
        fast_config(),
        events,
    );

    player
        .start(vec![point("A", 0.1, 0.0), point("B", 0.2, 0.0)], LoopTarget::Count(1))
        .unwrap();
    let summary = player.wait().unwrap();

    let received: Vec<PlaybackEvent> = rx
        .try_iter()
        .filter_map(|e| match e {
            TeachEvent::Playback(p) => Some(p),
            _ => None,
        })
        .collect();

    assert_eq!(
        received.first(),
        Some(&PlaybackEvent::Started {
            points: 2,
            loops: Some(1),
        })
    );
    assert_eq!(received.last(), Some(&PlaybackEvent::Finished(summary)));
    let completed = received
        .iter()
        .filter(|e| matches!(e, PlaybackEvent::PointCompleted { .. }))
        .count();
    assert_eq!(completed, 2);
    assert!(received.contains(&PlaybackEvent::LoopCompleted { loops_completed: 1 }));
}

#[test]
fn test_out_of_range_delay_file_never_reaches_playback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points.txt");
    std::fs::write(&path, "A|0|0.1,0,0,0,0,0\nB|1e20|0.2,0,0,0,0,0\n").unwrap();

    let mut store = PointStore::new();
    store.push(point("Keep", 0.3, 0.0));
    assert!(matches!(store.load(&path), Err(StoreError::Malformed { line: 2, .. })));
    assert_eq!(store.len(), 1);

    let sim = Arc::new(SimulatedActuator::new());
    let (events, rx) = EventSink::channel();
    let player = SequencePlayer::new(
        ready_session(sim.clone()),
        Arc::new(SharedSpeed::default()),
        fast_config(),
        events,
    );
    player.start(store.snapshot(), LoopTarget::Count(1)).unwrap();
    let summary = player.wait().unwrap();

    assert_eq!(summary.outcome, PlaybackOutcome::Completed);
    assert_eq!(summary.moves_ok, 1);
    assert!(
        rx.try_iter()
            .any(|e| matches!(e, TeachEvent::Playback(PlaybackEvent::Finished(_))))
    );
}

#[test]
fn test_stop_during_longest_delay() {
    let sim = Arc::new(SimulatedActuator::new());
    let player = player(&sim);

    player
        .start(vec![point("Long", 0.1, MAX_DELAY_SECS)], LoopTarget::Count(1))
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || sim.move_count() == 1));

    let begun = Instant::now();
    player.stop();
    let summary = player.wait().unwrap();

    assert!(begun.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.outcome, PlaybackOutcome::Stopped);
    assert_eq!(summary.moves_ok, 1);
}
