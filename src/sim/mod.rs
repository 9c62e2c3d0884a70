//! The simulation core: one pet, a sky of clouds, treats and poop, all
//! advanced by a fixed 100 ms tick. Timers are slots in a [`Scheduler`]
//! counted down by that tick, so every transition happens synchronously
//! inside [`Simulation::update`] or a user action.

pub mod clouds;
pub mod config;
pub mod scene;
pub mod schedule;
pub mod treats;

use std::time::Duration;

use glam::Vec2;

use crate::pet::{BehaviorState, Pet};

use self::clouds::CloudField;
use self::config::{SimConfig, TICK};
use self::scene::{PetView, Scene};
use self::schedule::{Scheduler, TimerSlot};
use self::treats::{Poops, Treats};

/// Sizes of the pet's animation frame sets, as provided by the asset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounts {
    pub walk: usize,
    pub sleep: usize,
}

/// All simulation state, owned in one place.
pub struct Simulation {
    config: SimConfig,
    rng: fastrand::Rng,
    pet: Pet,
    clouds: CloudField,
    treats: Treats,
    poops: Poops,
    scheduler: Scheduler,
    /// Treats eaten since the last poop.
    treat_streak: u32,
    tick_count: u64,
    dirty: bool,
}

impl Simulation {
    pub fn new(config: SimConfig, frames: FrameCounts, rng: fastrand::Rng) -> Self {
        let start = Vec2::new(config.pet_max_x() * 0.5, config.pet_y());
        let pet = Pet::new(start, config.pet_size, frames.walk, frames.sleep);

        let mut sim = Self {
            config,
            rng,
            pet,
            clouds: CloudField::new(),
            treats: Treats::new(),
            poops: Poops::new(),
            scheduler: Scheduler::new(),
            treat_streak: 0,
            tick_count: 0,
            dirty: true,
        };
        sim.enter_idle();
        sim
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance one tick: fire due timers, drift clouds, move the pet, eat.
    pub fn update(&mut self) {
        self.tick_count += 1;

        let fired = self.scheduler.advance(TICK);
        for slot in fired.iter() {
            self.fire(slot);
        }

        self.clouds.tick(&self.config, &mut self.rng);

        if !self.pet.state.is_frozen() {
            if self.pet.state == BehaviorState::Walking {
                let bounced = self.pet.step(self.config.pet_max_x());
                if bounced {
                    log::trace!("bounced at x={:.1}", self.pet.pos.x);
                }
            }
            self.check_treats();
        }

        self.dirty = true;
    }

    fn fire(&mut self, slot: TimerSlot) {
        match slot {
            TimerSlot::CollisionPause => {
                if self.pet.state == BehaviorState::CollisionPause {
                    log::debug!("pause over");
                    self.enter_idle();
                }
            }
            TimerSlot::Phase => self.next_phase(),
            TimerSlot::WalkFrame => {
                if self.pet.state == BehaviorState::Walking {
                    self.pet.walk.advance();
                }
            }
            TimerSlot::SleepFrame => {
                if self.pet.state == BehaviorState::Sleeping {
                    self.pet.sleep.advance();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Behavior transitions
    // -----------------------------------------------------------------------

    /// Phase timer handler: a stopped pet starts walking, a walking pet stops.
    fn next_phase(&mut self) {
        match self.pet.state {
            BehaviorState::Idle => self.start_walking(),
            BehaviorState::Walking => self.enter_idle(),
            BehaviorState::Sleeping | BehaviorState::CollisionPause => {}
        }
    }

    fn start_walking(&mut self) {
        let cfg = &self.config;
        let speed = cfg.walk_speed_min + self.rng.f32() * (cfg.walk_speed_max - cfg.walk_speed_min);
        let dir = if self.rng.bool() { 1.0 } else { -1.0 };

        self.pet.set_velocity(dir * speed);
        self.pet.state = BehaviorState::Walking;
        self.pet.walk.reset();
        self.scheduler
            .arm_repeating(TimerSlot::WalkFrame, self.config.walk_frame_period);
        self.arm_phase();
        log::debug!("walking at {:+.2}/tick", self.pet.vel_x);
    }

    /// The "currently stopped" branch, shared by walking, waking and
    /// the end of a collision pause.
    fn enter_idle(&mut self) {
        self.stop_moving();
        self.pet.state = BehaviorState::Idle;
        self.arm_phase();
    }

    fn stop_moving(&mut self) {
        self.pet.set_velocity(0.0);
        self.scheduler.cancel(TimerSlot::WalkFrame);
        self.pet.walk.reset();
    }

    fn arm_phase(&mut self) {
        let cfg = &self.config;
        let secs = cfg.phase_secs_min + self.rng.f32() * (cfg.phase_secs_max - cfg.phase_secs_min);
        self.scheduler
            .arm_once(TimerSlot::Phase, Duration::from_secs_f32(secs));
    }

    fn enter_collision_pause(&mut self) {
        self.scheduler.cancel(TimerSlot::Phase);
        self.stop_moving();
        self.pet.state = BehaviorState::CollisionPause;
        self.scheduler
            .arm_once(TimerSlot::CollisionPause, self.config.collision_pause);
    }

    // -----------------------------------------------------------------------
    // Treats & poop
    // -----------------------------------------------------------------------

    fn check_treats(&mut self) {
        let eaten = self
            .treats
            .eat_colliding(&self.pet.rect(), self.config.treat_size);
        if eaten == 0 {
            return;
        }

        self.treat_streak += eaten;
        log::debug!("ate {eaten} treat(s), streak {}", self.treat_streak);
        self.enter_collision_pause();

        if self.treat_streak >= self.config.poop_threshold {
            let pos = self.poop_position();
            self.poops.push(pos);
            self.treat_streak = 0;
            log::info!("pet pooped at ({:.0}, {:.0})", pos.x, pos.y);
        }
    }

    /// Level with the pet, behind it relative to the way it last moved.
    fn poop_position(&self) -> Vec2 {
        let cfg = &self.config;
        let pet = &self.pet;
        let y = pet.pos.y;
        let x = if pet.last_dir >= 0.0 {
            pet.pos.x - cfg.poop_gap - cfg.poop_size.x
        } else {
            pet.pos.x + pet.size.x + cfg.poop_gap
        };
        Vec2::new(x, y)
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    pub fn spawn_treat(&mut self) {
        let pos = self.treats.spawn(&self.config, &mut self.rng);
        log::debug!("treat dropped at x={:.0}", pos.x);
        self.dirty = true;
    }

    pub fn clean_all_poop(&mut self) {
        let removed = self.poops.clear();
        if removed > 0 {
            log::debug!("cleaned {removed} poop(s)");
        }
        self.dirty = true;
    }

    /// Ignored while already asleep or munching.
    pub fn sleep(&mut self) {
        if self.pet.state.is_frozen() {
            log::debug!("sleep ignored while {}", self.pet.state.label());
            return;
        }
        self.scheduler.cancel(TimerSlot::Phase);
        self.stop_moving();
        self.pet.state = BehaviorState::Sleeping;
        self.pet.sleep.reset();
        self.scheduler
            .arm_repeating(TimerSlot::SleepFrame, self.config.sleep_frame_period);
        log::debug!("pet fell asleep");
        self.dirty = true;
    }

    /// Ignored unless sleeping.
    pub fn wake(&mut self) {
        if self.pet.state != BehaviorState::Sleeping {
            log::debug!("wake ignored while {}", self.pet.state.label());
            return;
        }
        self.scheduler.cancel(TimerSlot::SleepFrame);
        self.pet.sleep.reset();
        self.enter_idle();
        log::debug!("pet woke up");
        self.dirty = true;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn scene(&self) -> Scene {
        let cfg = &self.config;
        Scene {
            pet: PetView {
                pos: self.pet.pos,
                size: self.pet.size,
                mirrored: self.pet.mirrored(),
                sprite: self.pet.sprite(),
            },
            cloud_size: cfg.cloud_size,
            clouds: self.clouds.clouds().iter().map(|c| c.pos).collect(),
            treat_size: cfg.treat_size,
            treats: self.treats.positions().to_vec(),
            poop_size: cfg.poop_size,
            poops: self.poops.positions().to_vec(),
        }
    }

    /// True once after anything visible changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn state(&self) -> BehaviorState {
        self.pet.state
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn treat_count(&self) -> usize {
        self.treats.len()
    }

    pub fn poop_count(&self) -> usize {
        self.poops.len()
    }

    pub fn treat_streak(&self) -> u32 {
        self.treat_streak
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::PetSprite;

    const FRAMES: FrameCounts = FrameCounts { walk: 2, sleep: 4 };

    fn sim(seed: u64) -> Simulation {
        let cfg = SimConfig::new(Vec2::new(320.0, 72.0));
        Simulation::new(cfg, FRAMES, fastrand::Rng::with_seed(seed))
    }

    fn phase_secs(s: &Simulation) -> f32 {
        s.scheduler
            .remaining(TimerSlot::Phase)
            .map(|d| d.as_secs_f32())
            .unwrap_or(-1.0)
    }

    #[test]
    fn starts_idle_in_the_middle_with_phase_armed() {
        let s = sim(1);
        assert_eq!(s.state(), BehaviorState::Idle);
        assert_eq!(s.pet().vel_x, 0.0);
        assert_eq!(s.pet().pos.x, (320.0 - 40.0) * 0.5);
        let p = phase_secs(&s);
        assert!((1.0..=5.0).contains(&p), "phase {p}");
    }

    #[test]
    fn phase_from_idle_starts_walking() {
        for seed in 0..50 {
            let mut s = sim(seed);
            s.fire(TimerSlot::Phase);
            assert_eq!(s.state(), BehaviorState::Walking);
            let speed = s.pet().vel_x.abs();
            assert!((1.0..=2.0).contains(&speed), "speed {speed}");
            assert_eq!(s.pet().walk.frame, 0);
            assert!(s.scheduler.is_armed(TimerSlot::WalkFrame));
            assert!((1.0..=5.0).contains(&phase_secs(&s)));
        }
    }

    #[test]
    fn phase_from_walking_stops() {
        let mut s = sim(2);
        s.fire(TimerSlot::Phase);
        s.fire(TimerSlot::Phase);
        assert_eq!(s.state(), BehaviorState::Idle);
        assert_eq!(s.pet().vel_x, 0.0);
        assert!(!s.scheduler.is_armed(TimerSlot::WalkFrame));
        assert!((1.0..=5.0).contains(&phase_secs(&s)));
    }

    #[test]
    fn walk_frames_alternate_every_fifth_of_a_second() {
        let mut s = sim(3);
        s.fire(TimerSlot::Phase);
        // Keep the phase timer out of the way.
        s.scheduler.arm_once(TimerSlot::Phase, Duration::from_secs(60));

        let frames: Vec<usize> = (0..6)
            .map(|_| {
                s.update();
                s.pet().walk.frame
            })
            .collect();
        assert_eq!(frames, [0, 1, 1, 0, 0, 1]);
        assert!(matches!(s.pet().sprite(), PetSprite::Walk(_)));
    }

    #[test]
    fn phase_is_ignored_while_frozen() {
        let mut s = sim(4);
        s.sleep();
        s.fire(TimerSlot::Phase);
        assert_eq!(s.state(), BehaviorState::Sleeping);

        let mut s = sim(4);
        s.treats.push(s.pet.pos);
        s.update();
        assert_eq!(s.state(), BehaviorState::CollisionPause);
        s.fire(TimerSlot::Phase);
        assert_eq!(s.state(), BehaviorState::CollisionPause);
    }

    #[test]
    fn sleeping_while_walking_freezes_until_woken() {
        let mut s = sim(5);
        s.fire(TimerSlot::Phase);
        s.update();
        s.sleep();
        assert_eq!(s.state(), BehaviorState::Sleeping);
        assert_eq!(s.pet().vel_x, 0.0);
        assert!(!s.scheduler.is_armed(TimerSlot::Phase));
        assert!(!s.scheduler.is_armed(TimerSlot::WalkFrame));

        let x = s.pet().pos.x;
        for _ in 0..100 {
            s.update();
            assert_eq!(s.pet().pos.x, x);
            assert_eq!(s.state(), BehaviorState::Sleeping);
        }

        s.wake();
        assert_eq!(s.state(), BehaviorState::Idle);
        assert!(!s.scheduler.is_armed(TimerSlot::SleepFrame));
        assert_eq!(s.pet().sleep.frame, 0);
        assert!((1.0..=5.0).contains(&phase_secs(&s)));
    }

    #[test]
    fn sleep_frames_advance_once_per_second() {
        let mut s = sim(6);
        s.sleep();
        assert_eq!(s.pet().sprite(), PetSprite::Sleep(0));

        let mut seen = Vec::new();
        for _ in 0..5 {
            for _ in 0..10 {
                s.update();
            }
            seen.push(s.pet().sleep.frame);
        }
        assert_eq!(seen, [1, 2, 3, 0, 1]);
    }

    #[test]
    fn sleep_and_wake_are_ignored_in_the_wrong_state() {
        let mut s = sim(7);
        s.wake();
        assert_eq!(s.state(), BehaviorState::Idle);

        s.treats.push(s.pet.pos);
        s.update();
        s.sleep();
        assert_eq!(s.state(), BehaviorState::CollisionPause);

        let mut s = sim(7);
        s.sleep();
        s.update();
        s.update();
        let frame_timer = s.scheduler.remaining(TimerSlot::SleepFrame);
        s.sleep();
        assert_eq!(s.scheduler.remaining(TimerSlot::SleepFrame), frame_timer);
    }

    #[test]
    fn six_treats_at_once_make_one_poop() {
        let mut s = sim(8);
        for _ in 0..6 {
            s.treats.push(s.pet.pos);
        }
        s.update();

        assert_eq!(s.treat_count(), 0);
        assert_eq!(s.poop_count(), 1);
        assert_eq!(s.treat_streak(), 0);
        assert_eq!(s.state(), BehaviorState::CollisionPause);
    }

    #[test]
    fn streak_accumulates_across_meals() {
        let mut s = sim(9);
        for eaten in 1..=5 {
            s.treats.push(s.pet.pos);
            s.update();
            assert_eq!(s.treat_streak(), eaten);
            assert_eq!(s.poop_count(), 0);
            s.fire(TimerSlot::CollisionPause);
            assert_eq!(s.state(), BehaviorState::Idle);
        }
        s.treats.push(s.pet.pos);
        s.update();
        assert_eq!(s.poop_count(), 1);
        assert_eq!(s.treat_streak(), 0);
    }

    #[test]
    fn pause_freezes_pet_and_skips_collisions_for_one_second() {
        let mut s = sim(10);
        s.fire(TimerSlot::Phase);
        s.treats.push(s.pet.pos + Vec2::new(s.pet.vel_x, 0.0));
        s.update();
        assert_eq!(s.state(), BehaviorState::CollisionPause);
        assert_eq!(s.pet().vel_x, 0.0);
        assert_eq!(s.pet().sprite(), PetSprite::Sleep(3));

        let x = s.pet().pos.x;
        s.treats.push(s.pet.pos);
        for _ in 0..9 {
            s.update();
            assert_eq!(s.state(), BehaviorState::CollisionPause);
            assert_eq!(s.pet().pos.x, x);
            assert_eq!(s.treat_count(), 1);
        }

        // Pause expires at the start of the tick, so the waiting treat is
        // eaten on the same tick and the pet pauses again.
        s.update();
        assert_eq!(s.treat_count(), 0);
        assert_eq!(s.treat_streak(), 2);
        assert_eq!(s.state(), BehaviorState::CollisionPause);
    }

    #[test]
    fn pause_ends_in_idle() {
        let mut s = sim(11);
        s.treats.push(s.pet.pos);
        s.update();
        for _ in 0..10 {
            s.update();
        }
        assert_eq!(s.state(), BehaviorState::Idle);
        assert!(!s.scheduler.is_armed(TimerSlot::CollisionPause));
        assert!((1.0..=5.0).contains(&phase_secs(&s)));
    }

    #[test]
    fn poop_lands_behind_the_pet() {
        let mut s = sim(12);
        s.treat_streak = 5;
        s.pet.set_velocity(1.5);
        s.treats.push(s.pet.pos);
        s.update();
        let pet = s.pet().clone();
        let poop = s.poops.positions()[0];
        assert_eq!(poop.x, pet.pos.x - 5.0 - s.config.poop_size.x);
        assert_eq!(poop.y, pet.pos.y);

        let mut s = sim(12);
        s.treat_streak = 5;
        s.pet.set_velocity(-1.5);
        s.treats.push(s.pet.pos);
        s.update();
        let pet = s.pet().clone();
        let poop = s.poops.positions()[0];
        assert_eq!(poop.x, pet.pos.x + pet.size.x + 5.0);
    }

    #[test]
    fn pet_stays_on_the_strip_and_turns_only_at_edges() {
        let mut s = sim(13);
        let max_x = s.config.pet_max_x();
        for _ in 0..5_000 {
            if s.state() == BehaviorState::Idle {
                s.fire(TimerSlot::Phase);
            }
            let before = s.pet().vel_x;
            s.update();
            let after = s.pet().vel_x;
            let x = s.pet().pos.x;
            assert!((0.0..=max_x).contains(&x), "x {x}");
            if before != 0.0 && after != 0.0 && before.signum() != after.signum() {
                assert!(x == 0.0 || x == max_x, "turned mid-strip at {x}");
            }
        }
    }

    #[test]
    fn cleaning_poop_leaves_everything_else_alone() {
        let mut s = sim(14);
        s.poops.push(Vec2::new(10.0, 40.0));
        s.poops.push(Vec2::new(90.0, 40.0));
        s.spawn_treat();
        s.spawn_treat();
        let treats = s.treats.positions().to_vec();
        let pet_pos = s.pet().pos;
        let state = s.state();

        s.clean_all_poop();
        assert_eq!(s.poop_count(), 0);
        s.clean_all_poop();
        assert_eq!(s.poop_count(), 0);

        assert_eq!(s.treats.positions(), treats.as_slice());
        assert_eq!(s.pet().pos, pet_pos);
        assert_eq!(s.state(), state);
    }

    #[test]
    fn empty_frame_sets_never_panic() {
        let cfg = SimConfig::new(Vec2::new(320.0, 72.0));
        let mut s = Simulation::new(
            cfg,
            FrameCounts { walk: 0, sleep: 0 },
            fastrand::Rng::with_seed(15),
        );
        s.fire(TimerSlot::Phase);
        for _ in 0..30 {
            s.update();
        }
        s.sleep();
        for _ in 0..30 {
            s.update();
        }
        assert_eq!(s.scene().pet.sprite, PetSprite::Idle);
        s.wake();
        s.treats.push(s.pet.pos);
        s.update();
        assert_eq!(s.scene().pet.sprite, PetSprite::Idle);
    }

    #[test]
    fn clouds_keep_drifting_while_asleep() {
        let mut s = sim(16);
        s.sleep();
        for _ in 0..500 {
            s.update();
            let scene = s.scene();
            assert!(!scene.clouds.is_empty());
            assert!(scene.clouds.iter().all(|c| c.x <= s.config.viewport.x));
        }
    }

    #[test]
    fn scene_mirrors_pet_moving_right() {
        let mut s = sim(17);
        s.pet.set_velocity(1.0);
        s.pet.state = BehaviorState::Walking;
        assert!(s.scene().pet.mirrored);
        s.pet.set_velocity(-1.0);
        assert!(!s.scene().pet.mirrored);
    }

    #[test]
    fn scene_lists_keep_registry_order() {
        let mut s = sim(19);
        let treats = [Vec2::new(250.0, 32.0), Vec2::new(5.0, 32.0), Vec2::new(120.0, 32.0)];
        for &t in &treats {
            s.treats.push(t);
        }
        let poops = [Vec2::new(300.0, 28.0), Vec2::new(2.0, 28.0)];
        for &p in &poops {
            s.poops.push(p);
        }
        for _ in 0..300 {
            s.clouds.tick(&s.config, &mut s.rng);
        }

        let scene = s.scene();
        assert_eq!(scene.treats, treats);
        assert_eq!(scene.poops, poops);

        let clouds: Vec<Vec2> = s.clouds.clouds().iter().map(|c| c.pos).collect();
        assert!(clouds.len() > 1);
        assert_eq!(scene.clouds, clouds);
        // Oldest cloud first, so it has drifted furthest right.
        assert!(scene.clouds.windows(2).all(|w| w[0].x > w[1].x));
    }

    #[test]
    fn dirty_flag_is_taken_once() {
        let mut s = sim(18);
        assert!(s.take_dirty());
        assert!(!s.take_dirty());
        s.update();
        assert!(s.take_dirty());
        s.spawn_treat();
        assert!(s.take_dirty());
        assert!(!s.take_dirty());
    }
}
