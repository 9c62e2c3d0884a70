use crate::pet::PetSprite;
use crate::sim::FrameCounts;

/// Shader frame id of a procedural sprite (see `render/shaders/sprite.wgsl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u32);

/// Everything the scene can ask to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Pet(PetSprite),
    Cloud,
    Treat,
    Poop,
}

/// Lookup table from logical sprites to drawable handles. Any entry may be
/// missing; callers skip what they can't resolve.
#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    pub pet_idle: Option<SpriteHandle>,
    pub walk: Vec<SpriteHandle>,
    pub sleep: Vec<SpriteHandle>,
    pub cloud: Option<SpriteHandle>,
    pub treat: Option<SpriteHandle>,
    pub poop: Option<SpriteHandle>,
}

impl SpriteSheet {
    /// The frames baked into the sprite shader.
    pub fn builtin() -> Self {
        Self {
            pet_idle: Some(SpriteHandle(0)),
            walk: vec![SpriteHandle(1), SpriteHandle(2)],
            sleep: (3..=6).map(SpriteHandle).collect(),
            cloud: Some(SpriteHandle(7)),
            treat: Some(SpriteHandle(8)),
            poop: Some(SpriteHandle(9)),
        }
    }

    pub fn frame_counts(&self) -> FrameCounts {
        FrameCounts {
            walk: self.walk.len(),
            sleep: self.sleep.len(),
        }
    }

    pub fn lookup(&self, key: SpriteKey) -> Option<SpriteHandle> {
        match key {
            SpriteKey::Pet(PetSprite::Idle) => self.pet_idle,
            SpriteKey::Pet(PetSprite::Walk(i)) => self.walk.get(i).copied(),
            SpriteKey::Pet(PetSprite::Sleep(i)) => self.sleep.get(i).copied(),
            SpriteKey::Cloud => self.cloud,
            SpriteKey::Treat => self.treat,
            SpriteKey::Poop => self.poop,
        }
    }
}
