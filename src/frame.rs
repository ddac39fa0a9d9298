//! Per-frame animation state and run loop control.
//!
//! [`pose_at`] is a pure function of the elapsed time. The app applies the pose
//! it returns to the scene graph, the lights and the offscreen hearts.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use cgmath::Vector3;

pub const HEART_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartPose {
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vector3<f32>,
    pub position: Vector3<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePose {
    pub seconds: f32,
    /// Rotation of the centerpiece about y, in radians.
    pub centerpiece_yaw: f32,
    pub spot_x: f32,
    pub hearts: [HeartPose; HEART_COUNT],
}

pub fn heart_pose(index: usize, seconds: f32) -> HeartPose {
    let speed = 1.0 + index as f32 * 0.1;
    let angle = seconds * speed;
    let offset = seconds.sin() * 3.0 + index as f32;
    HeartPose {
        rotation: Vector3::new(angle, angle, 0.0),
        position: Vector3::new(offset, 0.0, offset),
    }
}

pub fn pose_at(time_millis: f64) -> FramePose {
    let seconds = (time_millis * 0.001) as f32;
    FramePose {
        seconds,
        centerpiece_yaw: seconds,
        spot_x: seconds.sin() * 75.0,
        hearts: std::array::from_fn(|i| heart_pose(i, seconds)),
    }
}

/// Cloneable flag that ends the run loop once set.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Milliseconds since the first frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    start: instant::Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: instant::Instant::now(),
        }
    }

    pub fn elapsed_millis(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
