pub mod animation;

use glam::Vec2;

use crate::geom::Rect;

use self::animation::FrameCycle;

/// Current behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BehaviorState {
    Idle,
    Walking,
    Sleeping,
    /// Short freeze right after eating.
    CollisionPause,
}

impl BehaviorState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walking => "Walking",
            Self::Sleeping => "Sleeping",
            Self::CollisionPause => "Munching",
        }
    }

    /// States that ignore the phase scheduler and skip movement.
    pub fn is_frozen(self) -> bool {
        matches!(self, Self::Sleeping | Self::CollisionPause)
    }
}

/// Sprite the renderer should show for the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetSprite {
    Idle,
    Walk(usize),
    Sleep(usize),
}

/// The one and only pet.
#[derive(Debug, Clone)]
pub struct Pet {
    /// Top-left of the bounding box.
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal velocity in units/tick.
    pub vel_x: f32,
    pub state: BehaviorState,
    pub walk: FrameCycle,
    pub sleep: FrameCycle,
    /// Sign of the last non-zero velocity. Starts at +1.
    pub last_dir: f32,
}

impl Pet {
    pub fn new(pos: Vec2, size: Vec2, walk_frames: usize, sleep_frames: usize) -> Self {
        Self {
            pos,
            size,
            vel_x: 0.0,
            state: BehaviorState::Idle,
            walk: FrameCycle::new(walk_frames),
            sleep: FrameCycle::new(sleep_frames),
            last_dir: 1.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn set_velocity(&mut self, vel_x: f32) {
        self.vel_x = vel_x;
        if vel_x != 0.0 {
            self.last_dir = vel_x.signum();
        }
    }

    /// Sprite faces left by default; flip while moving right.
    pub fn mirrored(&self) -> bool {
        self.vel_x > 0.0
    }

    /// Move one tick and bounce off the strip ends. Returns true when the
    /// pet hit an edge and turned around.
    pub fn step(&mut self, max_x: f32) -> bool {
        self.pos.x += self.vel_x;
        if self.pos.x <= 0.0 {
            self.pos.x = 0.0;
            self.set_velocity(self.vel_x.abs());
            true
        } else if self.pos.x >= max_x {
            self.pos.x = max_x;
            self.set_velocity(-self.vel_x.abs());
            true
        } else {
            false
        }
    }

    /// First match wins: pause shows the last sleep frame, then sleep,
    /// walk, idle. Empty frame sets fall back to idle.
    pub fn sprite(&self) -> PetSprite {
        let frame = match self.state {
            BehaviorState::CollisionPause => self.sleep.last().map(PetSprite::Sleep),
            BehaviorState::Sleeping => self.sleep.current().map(PetSprite::Sleep),
            BehaviorState::Walking => self.walk.current().map(PetSprite::Walk),
            BehaviorState::Idle => None,
        };
        frame.unwrap_or(PetSprite::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet() -> Pet {
        Pet::new(Vec2::new(50.0, 10.0), Vec2::splat(20.0), 2, 4)
    }

    #[test]
    fn bounces_off_left_edge() {
        let mut p = pet();
        p.pos.x = 1.0;
        p.set_velocity(-2.0);
        assert!(p.step(100.0));
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(p.vel_x, 2.0);
        assert!(p.mirrored());
    }

    #[test]
    fn bounces_off_right_edge() {
        let mut p = pet();
        p.pos.x = 99.5;
        p.set_velocity(1.5);
        assert!(p.step(100.0));
        assert_eq!(p.pos.x, 100.0);
        assert_eq!(p.vel_x, -1.5);
        assert_eq!(p.last_dir, -1.0);
    }

    #[test]
    fn mid_strip_step_keeps_direction() {
        let mut p = pet();
        p.set_velocity(1.25);
        assert!(!p.step(100.0));
        assert_eq!(p.pos.x, 51.25);
        assert_eq!(p.vel_x, 1.25);
    }

    #[test]
    fn stopping_remembers_last_direction() {
        let mut p = pet();
        p.set_velocity(-1.0);
        p.set_velocity(0.0);
        assert_eq!(p.last_dir, -1.0);
        assert!(!p.mirrored());
    }

    #[test]
    fn sprite_priority() {
        let mut p = pet();
        assert_eq!(p.sprite(), PetSprite::Idle);

        p.state = BehaviorState::Walking;
        p.walk.advance();
        assert_eq!(p.sprite(), PetSprite::Walk(1));

        p.state = BehaviorState::Sleeping;
        p.sleep.advance();
        assert_eq!(p.sprite(), PetSprite::Sleep(1));

        p.state = BehaviorState::CollisionPause;
        assert_eq!(p.sprite(), PetSprite::Sleep(3));
    }

    #[test]
    fn empty_frame_sets_fall_back_to_idle() {
        let mut p = Pet::new(Vec2::ZERO, Vec2::splat(20.0), 0, 0);
        for state in [
            BehaviorState::Walking,
            BehaviorState::Sleeping,
            BehaviorState::CollisionPause,
        ] {
            p.state = state;
            assert_eq!(p.sprite(), PetSprite::Idle);
        }
    }
}
