use std::time::Duration;

use glam::Vec2;

/// Simulated time covered by one `update` call.
pub const TICK: Duration = Duration::from_millis(100);

/// Fixed parameters for one simulation. The viewport comes from the host;
/// everything else is a constant of the toy and is not meant to be tuned
/// at runtime.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Viewport size in logical pixels.
    pub viewport: Vec2,

    pub pet_size: Vec2,
    /// Gap between the pet's feet and the bottom of the viewport.
    pub ground_margin: f32,
    /// Walk speed range in units/tick.
    pub walk_speed_min: f32,
    pub walk_speed_max: f32,
    /// Idle/walk phase duration range in seconds.
    pub phase_secs_min: f32,
    pub phase_secs_max: f32,
    pub walk_frame_period: Duration,
    pub sleep_frame_period: Duration,
    pub collision_pause: Duration,

    pub cloud_size: Vec2,
    /// Cloud speed in units/tick.
    pub cloud_speed: f32,
    /// Distance the newest cloud must travel before the next one spawns.
    pub cloud_spawn_gate: f32,
    pub cloud_y_min: f32,
    pub cloud_y_max: f32,

    pub treat_size: Vec2,
    /// Treat height below the top of the pet's band.
    pub treat_y_offset: f32,

    pub poop_size: Vec2,
    /// Treats eaten before the pet leaves a poop behind.
    pub poop_threshold: u32,
    /// Distance between the poop and the pet.
    pub poop_gap: f32,
}

impl SimConfig {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            pet_size: Vec2::new(40.0, 40.0),
            ground_margin: 4.0,
            walk_speed_min: 1.0,
            walk_speed_max: 2.0,
            phase_secs_min: 1.0,
            phase_secs_max: 5.0,
            walk_frame_period: Duration::from_millis(200),
            sleep_frame_period: Duration::from_secs(1),
            collision_pause: Duration::from_secs(1),
            cloud_size: Vec2::new(48.0, 24.0),
            cloud_speed: 1.5,
            cloud_spawn_gate: 100.0,
            cloud_y_min: 10.0,
            cloud_y_max: 20.0,
            treat_size: Vec2::new(14.0, 14.0),
            treat_y_offset: 4.0,
            poop_size: Vec2::new(14.0, 12.0),
            poop_threshold: 6,
            poop_gap: 5.0,
        }
    }

    /// Largest x the pet may occupy.
    pub fn pet_max_x(&self) -> f32 {
        (self.viewport.x - self.pet_size.x).max(0.0)
    }

    /// The pet walks along a fixed ground line.
    pub fn pet_y(&self) -> f32 {
        (self.viewport.y - self.pet_size.y - self.ground_margin).max(0.0)
    }

    /// Height at which new treats appear.
    pub fn treat_y(&self) -> f32 {
        self.pet_y() + self.treat_y_offset
    }
}
