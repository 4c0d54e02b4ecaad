//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only advances through frame ticks
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or physics dependencies; those are reached through
//!   [`Command`]s

pub mod events;
pub mod gesture;
pub mod hit;
pub mod kinematics;
pub mod registry;
pub mod scheduler;
pub mod sequence;
pub mod session;
pub mod state;
pub mod timers;

pub use events::{Command, EffectKind, GameEvent, Outbox};
pub use gesture::{GestureTracker, SwipePath};
pub use hit::{CircleProbe, HitProbe, HitReport};
pub use kinematics::SpawnDescriptor;
pub use registry::{ActiveEntityRegistry, SweepReport};
pub use scheduler::{SpawnRequest, SpawnScheduler};
pub use sequence::{ForceMode, SpawnPattern, WARMUP, build_sequence};
pub use session::{Deferred, Session};
pub use state::{Entity, EntityId, EntityKind, GamePhase, GameState};
pub use timers::TimerQueue;
