use glam::Vec2;

use super::config::SimConfig;

/// A decorative cloud drifting left to right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    /// Units per tick, always positive.
    pub speed: f32,
}

/// Background clouds. Purely visual; nothing collides with them.
#[derive(Debug, Default)]
pub struct CloudField {
    clouds: Vec<Cloud>,
}

impl CloudField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest first.
    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    /// Move, retire clouds past the right edge, then maybe spawn one more.
    /// The spawn gate looks at post-move positions.
    pub fn tick(&mut self, config: &SimConfig, rng: &mut fastrand::Rng) {
        for cloud in &mut self.clouds {
            cloud.pos.x += cloud.speed;
        }
        let right_edge = config.viewport.x;
        self.clouds.retain(|c| c.pos.x <= right_edge);

        let spawn_x = -config.cloud_size.x;
        let should_spawn = match self.clouds.last() {
            None => true,
            Some(newest) => newest.pos.x - spawn_x > config.cloud_spawn_gate,
        };
        if should_spawn {
            let y = config.cloud_y_min + rng.f32() * (config.cloud_y_max - config.cloud_y_min);
            self.clouds.push(Cloud {
                pos: Vec2::new(spawn_x, y),
                speed: config.cloud_speed,
            });
        }
    }
}
