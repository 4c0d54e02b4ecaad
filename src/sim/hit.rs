//! Swipe hit resolution
//!
//! Geometry is a collaborator concern: a [`HitProbe`] answers which entities
//! contain a point. This module only applies the outcome policy. A target is
//! scored once no matter how many samples land on it; a hazard ends the game.

use glam::Vec2;

use super::events::{Command, EffectKind, Outbox};
use super::registry::ActiveEntityRegistry;
use super::state::{EntityId, EntityKind, GameState};
use crate::audio::SoundCue;

/// Point-in-entity query, supplied by the scene/physics side
pub trait HitProbe {
    /// Entities whose bounds contain `point`. May repeat ids.
    fn entities_at(&self, registry: &ActiveEntityRegistry, point: Vec2) -> Vec<EntityId>;
}

/// Circle of fixed radius around each entity's last known position
#[derive(Debug, Clone, Copy)]
pub struct CircleProbe {
    pub radius: f32,
}

impl CircleProbe {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl HitProbe for CircleProbe {
    fn entities_at(&self, registry: &ActiveEntityRegistry, point: Vec2) -> Vec<EntityId> {
        let radius_sq = self.radius * self.radius;
        registry
            .iter()
            .filter(|e| e.is_hittable() && e.position.distance_squared(point) <= radius_sq)
            .map(|e| e.id)
            .collect()
    }
}

/// What one batch of samples struck
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitReport {
    pub targets: Vec<EntityId>,
    pub hazard: Option<EntityId>,
}

impl HitReport {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.hazard.is_none()
    }
}

/// Apply every hit under `samples`, in sample order
///
/// Stops as soon as the game ends; nothing after a hazard hit is honored.
pub fn resolve(
    samples: &[Vec2],
    probe: &dyn HitProbe,
    registry: &mut ActiveEntityRegistry,
    state: &mut GameState,
    out: &mut Outbox,
) -> HitReport {
    let mut report = HitReport::default();
    if state.is_ended() {
        return report;
    }

    for &sample in samples {
        for id in probe.entities_at(registry, sample) {
            let Some(entity) = registry.get_mut(id) else {
                continue;
            };
            if !entity.is_hittable() {
                continue;
            }
            entity.hit_testable = false;
            entity.alive = false;
            let kind = entity.kind;
            let position = entity.position;
            registry.remove(id);
            out.command(Command::Remove { id });

            match kind {
                EntityKind::Target => {
                    log::debug!("Sliced target {:?}", id);
                    out.command(Command::PlayEffect {
                        effect: EffectKind::SliceTarget,
                        position,
                    });
                    out.command(Command::Play {
                        cue: SoundCue::Whack,
                    });
                    state.add_score(1, out);
                    report.targets.push(id);
                }
                EntityKind::Hazard => {
                    log::debug!("Sliced hazard {:?}", id);
                    out.command(Command::PlayEffect {
                        effect: EffectKind::SliceHazard,
                        position,
                    });
                    out.command(Command::Play {
                        cue: SoundCue::Explosion,
                    });
                    report.hazard = Some(id);
                    state.end_game(true, out);
                    return report;
                }
            }
        }
    }
    report
}
