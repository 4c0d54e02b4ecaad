//! Session driver
//!
//! Wires the components together on one logical thread. Frame ticks advance
//! the clock, fire due deferred tasks, sweep the field and re-trigger the
//! scheduler; pointer events feed the gesture tracker and hit resolver.
//! Everything the collaborators must do is queued in an [`Outbox`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::events::{Command, Outbox};
use super::gesture::GestureTracker;
use super::hit::{self, CircleProbe, HitProbe, HitReport};
use super::kinematics;
use super::registry::{ActiveEntityRegistry, SweepReport};
use super::scheduler::SpawnScheduler;
use super::sequence::{ForceMode, SpawnPattern, build_sequence};
use super::state::{Entity, EntityId, EntityKind, GameState};
use super::timers::TimerQueue;
use crate::audio::SoundCue;
use crate::settings::{Settings, SettingsError};

/// Work waiting on the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deferred {
    /// Throw the next pattern
    Advance,
    /// Staggered chain spawn
    ChainSpawn(ForceMode),
    /// Swoosh cue finished, another may play
    SwooshReady,
}

/// One game session
pub struct Session {
    settings: Settings,
    state: GameState,
    rng: Pcg32,
    scheduler: SpawnScheduler,
    registry: ActiveEntityRegistry,
    gesture: GestureTracker,
    timers: TimerQueue<Deferred>,
    probe: CircleProbe,
    /// Session clock (seconds)
    now: f64,
    started: bool,
    torn_down: bool,
    swoosh_active: bool,
    out: Outbox,
}

impl Session {
    /// New session with a freshly planned pattern sequence
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        if settings.random_patterns == 0 {
            log::warn!("random_patterns is 0; only the warm-up patterns will be thrown");
        }
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let sequence = build_sequence(settings.random_patterns, &mut rng);
        Ok(Self::assemble(settings, sequence, rng))
    }

    /// New session throwing a caller-supplied sequence
    pub fn with_sequence(
        settings: Settings,
        sequence: Vec<SpawnPattern>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let rng = Pcg32::seed_from_u64(settings.seed);
        Ok(Self::assemble(settings, sequence, rng))
    }

    fn assemble(settings: Settings, sequence: Vec<SpawnPattern>, rng: Pcg32) -> Self {
        Self {
            state: GameState::new(&settings),
            scheduler: SpawnScheduler::new(sequence, &settings),
            registry: ActiveEntityRegistry::new(),
            gesture: GestureTracker::new(settings.swipe_capacity),
            timers: TimerQueue::new(),
            probe: CircleProbe::new(settings.body_radius),
            now: 0.0,
            started: false,
            torn_down: false,
            swoosh_active: false,
            out: Outbox::default(),
            rng,
            settings,
        }
    }

    /// Configure physics and queue the first pattern after the start delay
    pub fn start(&mut self) {
        if self.started || self.torn_down {
            return;
        }
        self.started = true;
        self.out.command(Command::ConfigureWorld {
            gravity: self.settings.gravity,
            speed: self.state.world_speed as f32,
        });
        self.timers.schedule(self.now + self.settings.start_delay, Deferred::Advance);
        log::info!(
            "Session started (seed {}, {} patterns)",
            self.settings.seed,
            self.scheduler.sequence().len()
        );
    }

    /// Per-frame driver
    ///
    /// `positions` is the physics feed of current entity positions; entities
    /// it omits keep their last known position.
    pub fn on_frame_tick(&mut self, dt: f64, positions: &[(EntityId, Vec2)]) -> SweepReport {
        if self.torn_down {
            return SweepReport::default();
        }
        self.now += dt.max(0.0);
        self.run_due_timers();

        if self.state.is_ended() {
            return SweepReport::default();
        }

        let report = self.registry.sweep(
            positions,
            self.settings.offscreen_threshold,
            &mut self.state,
            &mut self.out,
        );
        if self.state.fuse_loop.is_some() && !self.registry.has_live_hazard() {
            self.state.stop_fuse(&mut self.out);
        }

        if let Some(delay) = self
            .scheduler
            .retrigger(&mut self.state, self.registry.is_empty())
        {
            self.timers.schedule(self.now + delay, Deferred::Advance);
        }
        report
    }

    pub fn on_pointer_down(&mut self, point: Vec2) {
        if self.is_inert() {
            return;
        }
        self.gesture.on_pointer_down(point);
        self.publish_path();
    }

    /// Single pointer sample, hit-tested with the built-in circle probe
    pub fn on_pointer_move(&mut self, point: Vec2) -> HitReport {
        self.on_pointer_move_samples(&[point])
    }

    /// Coalesced pointer samples from one move event
    pub fn on_pointer_move_samples(&mut self, samples: &[Vec2]) -> HitReport {
        let probe = self.probe;
        self.on_pointer_move_with(samples, &probe)
    }

    /// Move event hit-tested against caller-supplied geometry
    pub fn on_pointer_move_with(&mut self, samples: &[Vec2], probe: &dyn HitProbe) -> HitReport {
        if self.is_inert() || samples.is_empty() {
            return HitReport::default();
        }
        for &point in samples {
            self.gesture.on_pointer_move(point);
        }
        self.publish_path();

        if !self.swoosh_active {
            self.swoosh_active = true;
            self.out.command(Command::Play {
                cue: SoundCue::random_swoosh(&mut self.rng),
            });
            self.timers
                .schedule(self.now + self.settings.swoosh_duration, Deferred::SwooshReady);
        }

        hit::resolve(
            samples,
            probe,
            &mut self.registry,
            &mut self.state,
            &mut self.out,
        )
    }

    pub fn on_pointer_up(&mut self) {
        if self.is_inert() {
            return;
        }
        self.gesture.on_pointer_up();
        self.out.command(Command::FadeSwipe);
    }

    /// Remove every remaining entity and drop pending work
    ///
    /// The session is inert afterwards: ticks and pointer input are ignored
    /// and no further pattern is thrown.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.state.next_sequence_queued = true;
        for id in self.registry.iter().map(|e| e.id).collect::<Vec<_>>() {
            self.out.command(Command::Remove { id });
        }
        self.registry.clear();
        self.timers.retain(|_| false);
        self.state.stop_fuse(&mut self.out);
    }

    /// Take all queued commands and events
    pub fn drain(&mut self) -> Outbox {
        self.out.take()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn registry(&self) -> &ActiveEntityRegistry {
        &self.registry
    }

    pub fn gesture(&self) -> &GestureTracker {
        &self.gesture
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Ended or torn down; input has no effect
    fn is_inert(&self) -> bool {
        self.torn_down || self.state.is_ended()
    }

    /// Pending advance timers (never more than one)
    pub fn pending_advances(&self) -> usize {
        self.timers.count(|t| *t == Deferred::Advance)
    }

    /// Deadlines of pending chain spawns, earliest first
    pub fn pending_chain_spawns(&self) -> Vec<f64> {
        self.timers.deadlines(|t| matches!(t, Deferred::ChainSpawn(_)))
    }

    fn run_due_timers(&mut self) {
        while let Some((due, task)) = self.timers.pop_due(self.now) {
            match task {
                Deferred::Advance => self.advance(due),
                Deferred::ChainSpawn(force) => {
                    if self.state.is_ended() && !self.settings.spawns_after_game_over {
                        continue;
                    }
                    self.spawn(force);
                }
                Deferred::SwooshReady => self.swoosh_active = false,
            }
        }
    }

    /// Scheduler step; `at` is the logical time the advance fired
    fn advance(&mut self, at: f64) {
        let position = self.state.sequence_position;
        let requests = self.scheduler.advance(&mut self.state);
        if self.state.sequence_position == position {
            return;
        }
        self.out.command(Command::SetWorldSpeed {
            speed: self.state.world_speed as f32,
        });
        for request in requests {
            if request.is_immediate() {
                self.spawn(request.force);
            } else {
                self.timers
                    .schedule(at + request.delay, Deferred::ChainSpawn(request.force));
            }
        }
    }

    fn spawn(&mut self, force: ForceMode) -> EntityId {
        let descriptor = kinematics::spawn(force, &mut self.rng);
        let id = self.registry.next_entity_id();
        let velocity = descriptor.scaled_velocity(self.settings.velocity_scale);

        self.out.command(Command::Present {
            id,
            kind: descriptor.kind,
            position: descriptor.position,
        });
        self.out.command(Command::AssignBody {
            id,
            radius: self.settings.body_radius,
            collision_mask: 0,
            velocity,
            angular_velocity: descriptor.angular_velocity,
        });
        match descriptor.kind {
            EntityKind::Target => self.out.command(Command::Play {
                cue: SoundCue::Launch,
            }),
            // Nothing sweeps after game over, so a fuse started now would never stop
            EntityKind::Hazard if self.state.is_ended() => {}
            EntityKind::Hazard => self.state.start_fuse(&mut self.out),
        }
        log::debug!(
            "Spawned {:?} {:?} at x={} v={}",
            descriptor.kind,
            id,
            descriptor.position.x,
            velocity
        );

        self.registry.register(Entity::new(
            id,
            descriptor.kind,
            descriptor.position,
            velocity,
            descriptor.angular_velocity,
        ));
        id
    }

    fn publish_path(&mut self) {
        self.out.command(Command::SwipePathChanged {
            points: self.gesture.current_path().to_vec(),
        });
    }
}
