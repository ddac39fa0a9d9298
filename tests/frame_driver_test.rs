use pagoda_garden::frame::{FrameClock, HEART_COUNT, StopHandle, heart_pose, pose_at};

const EPS: f32 = 1e-5;

#[test]
fn should_place_hearts_on_their_sine_offsets() {
    let t = 1.3_f32;
    let pose = pose_at(1300.0);
    for i in 0..HEART_COUNT {
        let expected = t.sin() * 3.0 + i as f32;
        let heart = &pose.hearts[i];
        assert!((heart.position.x - expected).abs() < EPS, "heart {i} x");
        assert!((heart.position.z - expected).abs() < EPS, "heart {i} z");
        assert_eq!(heart.position.y, 0.0);
    }
}

#[test]
fn should_spin_each_heart_faster_than_the_last() {
    let t = 2.0;
    for i in 0..HEART_COUNT {
        let heart = heart_pose(i, t);
        let expected = t * (1.0 + 0.1 * i as f32);
        assert!((heart.rotation.x - expected).abs() < EPS);
        assert!((heart.rotation.y - expected).abs() < EPS);
        assert_eq!(heart.rotation.z, 0.0);
    }
}

#[test]
fn should_turn_centerpiece_by_elapsed_seconds() {
    for millis in [0.0, 16.0, 500.0, 1000.0, 12_345.0] {
        let pose = pose_at(millis);
        let seconds = (millis * 0.001) as f32;
        assert!((pose.centerpiece_yaw - seconds).abs() < EPS);
        assert!((pose.seconds - seconds).abs() < EPS);
    }
}

#[test]
fn should_swing_spot_light_along_x() {
    let pose = pose_at(std::f64::consts::FRAC_PI_2 * 1000.0);
    assert!((pose.spot_x - 75.0).abs() < 1e-3);
    assert_eq!(pose_at(0.0).spot_x, 0.0);
}

#[test]
fn should_derive_identical_poses_from_identical_times() {
    assert_eq!(pose_at(4321.5), pose_at(4321.5));
    assert_ne!(pose_at(4321.5), pose_at(4322.5));
}

#[test]
fn should_share_stop_state_between_clones() {
    let stop = StopHandle::new();
    let remote = stop.clone();
    assert!(!stop.is_stopped());
    remote.stop();
    assert!(stop.is_stopped());
}

#[test]
fn should_count_time_forward() {
    let clock = FrameClock::new();
    let first = clock.elapsed_millis();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(clock.elapsed_millis() > first);
    assert!(first >= 0.0);
}
