//! Slice Rush headless runner
//!
//! Drives the logic core with a tiny ballistic integrator standing in for the
//! physics collaborator and an autopilot standing in for the player.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use slice_rush::{Settings, on_screen};
use slice_rush::sim::{Command, EntityId, EntityKind, Outbox, Session};

/// SpriteKit-style gravity is in meters; the field is in points
const POINTS_PER_METER: f32 = 150.0;

#[derive(Debug, Parser)]
#[command(name = "slice-rush", about = "Run a headless Slice Rush session")]
struct Args {
    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Simulated seconds before giving up
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,
    /// Frame rate of the simulated render loop
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Chance the autopilot goes for any given target
    #[arg(long, default_value_t = 0.9)]
    accuracy: f64,
    /// Print every command and event as a JSON line
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
struct Body {
    kind: EntityKind,
    pos: Vec2,
    vel: Vec2,
}

/// Minimal physics collaborator: gravity and world speed, nothing else
#[derive(Debug, Default)]
struct Ballistics {
    bodies: HashMap<EntityId, Body>,
    gravity: f32,
    speed: f32,
}

impl Ballistics {
    fn apply(&mut self, commands: &[Command]) {
        for command in commands {
            match command {
                Command::ConfigureWorld { gravity, speed } => {
                    self.gravity = *gravity * POINTS_PER_METER;
                    self.speed = *speed;
                }
                Command::SetWorldSpeed { speed } => self.speed = *speed,
                Command::Present { id, kind, position } => {
                    self.bodies.insert(
                        *id,
                        Body {
                            kind: *kind,
                            pos: *position,
                            vel: Vec2::ZERO,
                        },
                    );
                }
                Command::AssignBody { id, velocity, .. } => {
                    if let Some(body) = self.bodies.get_mut(id) {
                        body.vel = *velocity;
                    }
                }
                Command::Remove { id } => {
                    self.bodies.remove(id);
                }
                _ => {}
            }
        }
    }

    /// Integrate one frame and report positions, sorted by id
    fn step(&mut self, dt: f32) -> Vec<(EntityId, Vec2)> {
        let dt = dt * self.speed;
        let mut positions: Vec<_> = self
            .bodies
            .iter_mut()
            .map(|(id, body)| {
                body.vel.y += self.gravity * dt;
                body.pos += body.vel * dt;
                (*id, body.pos)
            })
            .collect();
        positions.sort_by_key(|(id, _)| *id);
        positions
    }
}

/// Swipes through falling targets, steering clear of hazards
struct Autopilot {
    rng: Pcg32,
    accuracy: f64,
    clearance: f32,
    /// Per-target decision, rolled once
    intent: HashMap<EntityId, bool>,
}

impl Autopilot {
    fn new(seed: u64, accuracy: f64, clearance: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0xA070_9170),
            accuracy: accuracy.clamp(0.0, 1.0),
            clearance,
            intent: HashMap::new(),
        }
    }

    fn play(&mut self, session: &mut Session, world: &Ballistics) {
        // Most urgent first: lowest target that is already falling
        let mut candidates: Vec<_> = world
            .bodies
            .iter()
            .filter(|(_, b)| b.kind == EntityKind::Target && on_screen(b.pos) && b.vel.y < 0.0)
            .collect();
        candidates.sort_by(|a, b| a.1.pos.y.total_cmp(&b.1.pos.y).then(a.0.cmp(b.0)));

        for (id, body) in candidates {
            let go = *self
                .intent
                .entry(*id)
                .or_insert_with(|| self.rng.random_bool(self.accuracy));
            if !go {
                continue;
            }
            let near_hazard = world.bodies.values().any(|other| {
                other.kind == EntityKind::Hazard && other.pos.distance(body.pos) < self.clearance
            });
            if near_hazard {
                continue;
            }

            let start = body.pos - Vec2::new(self.clearance, 0.0);
            session.on_pointer_down(start);
            let midway = body.pos - Vec2::new(self.clearance / 2.0, 0.0);
            session.on_pointer_move_samples(&[midway, body.pos]);
            session.on_pointer_up();
            return;
        }
    }
}

fn report(outbox: &Outbox, json: bool) -> Result<()> {
    if json {
        for command in &outbox.commands {
            println!("{}", serde_json::to_string(command)?);
        }
    }
    for event in &outbox.events {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            log::info!("{event:?}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    let fps = args.fps.max(1);
    let clearance = settings.body_radius * 2.0;
    let seed = settings.seed;

    let mut session = Session::new(settings).context("invalid settings")?;
    let mut world = Ballistics::default();
    let mut pilot = Autopilot::new(seed, args.accuracy, clearance);

    session.start();
    let outbox = session.drain();
    world.apply(&outbox.commands);
    report(&outbox, args.json)?;

    let dt = 1.0 / fps as f64;
    let frames = (args.seconds * fps as f64).ceil() as u64;
    for _ in 0..frames {
        let positions = world.step(dt as f32);
        session.on_frame_tick(dt, &positions);
        pilot.play(&mut session, &world);

        let outbox = session.drain();
        world.apply(&outbox.commands);
        report(&outbox, args.json)?;

        if session.is_ended() {
            break;
        }
    }

    session.teardown();
    let outbox = session.drain();
    world.apply(&outbox.commands);
    report(&outbox, args.json)?;

    let state = session.state();
    let outcome = match state.end_cause() {
        Some(true) => "sliced a hazard",
        Some(false) => "out of lives",
        None => "time limit",
    };
    log::info!(
        "Finished after {:.1}s ({outcome}): score {}, lives {}, patterns thrown {}",
        session.now(),
        state.score,
        state.lives,
        state.sequence_position
    );
    Ok(())
}
