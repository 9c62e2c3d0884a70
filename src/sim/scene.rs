use glam::Vec2;

use crate::pet::PetSprite;

/// Read-only view of everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub pet: PetView,
    pub cloud_size: Vec2,
    pub clouds: Vec<Vec2>,
    pub treat_size: Vec2,
    pub treats: Vec<Vec2>,
    pub poop_size: Vec2,
    pub poops: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetView {
    pub pos: Vec2,
    pub size: Vec2,
    /// Flip the sprite horizontally.
    pub mirrored: bool,
    pub sprite: PetSprite,
}
