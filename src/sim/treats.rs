use glam::Vec2;

use crate::geom::Rect;

use super::config::SimConfig;

// ---------------------------------------------------------------------------
// Treats
// ---------------------------------------------------------------------------

/// Treats waiting to be eaten, in spawn order.
#[derive(Debug, Default)]
pub struct Treats {
    positions: Vec<Vec2>,
}

impl Treats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Drop a treat somewhere along the strip at the pet's reach height.
    pub fn spawn(&mut self, config: &SimConfig, rng: &mut fastrand::Rng) -> Vec2 {
        let max_x = (config.viewport.x - config.treat_size.x).max(0.0);
        let pos = Vec2::new(rng.f32() * max_x, config.treat_y());
        self.positions.push(pos);
        pos
    }

    /// Place a treat at an exact spot.
    #[cfg(test)]
    pub fn push(&mut self, pos: Vec2) {
        self.positions.push(pos);
    }

    /// Remove every treat overlapping `eater`. Survivors keep their order.
    /// Returns how many were eaten.
    pub fn eat_colliding(&mut self, eater: &Rect, treat_size: Vec2) -> u32 {
        let before = self.positions.len();
        self.positions
            .retain(|&pos| !Rect::new(pos, treat_size).intersects(eater));
        (before - self.positions.len()) as u32
    }
}

// ---------------------------------------------------------------------------
// Poop
// ---------------------------------------------------------------------------

/// Poop left behind by a well-fed pet. Only cleaning removes it.
#[derive(Debug, Default)]
pub struct Poops {
    positions: Vec<Vec2>,
}

impl Poops {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn push(&mut self, pos: Vec2) {
        self.positions.push(pos);
    }

    pub fn clear(&mut self) -> usize {
        let n = self.positions.len();
        self.positions.clear();
        n
    }
}
