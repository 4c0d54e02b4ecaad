//! Live entity registry
//!
//! Owns every entity from spawn until it is sliced, falls off the bottom, or
//! the session is torn down. Entities are kept sorted by id for deterministic
//! iteration.

use glam::Vec2;

use super::events::{Command, Outbox};
use super::state::{Entity, EntityId, EntityKind, GameState};

/// Result of one off-screen sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Targets that escaped (each cost a life)
    pub missed_targets: Vec<EntityId>,
    /// Hazards that fell away harmlessly
    pub expired_hazards: Vec<EntityId>,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.missed_targets.len() + self.expired_hazards.len()
    }
}

#[derive(Debug, Clone)]
pub struct ActiveEntityRegistry {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for ActiveEntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveEntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity to the live set
    pub fn register(&mut self, entity: Entity) {
        let at = self.entities.partition_point(|e| e.id < entity.id);
        self.entities.insert(at, entity);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let index = self.index_of(id)?;
        Some(&self.entities[index])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = self.index_of(id)?;
        Some(&mut self.entities[index])
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn has_live_hazard(&self) -> bool {
        self.entities
            .iter()
            .any(|e| e.alive && e.kind == EntityKind::Hazard)
    }

    /// Drop everything (session teardown)
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Per-frame off-screen pass
    ///
    /// Applies the reported positions, then removes every live entity below
    /// `threshold`. A missed target costs a life; a missed hazard is free.
    pub fn sweep(
        &mut self,
        positions: &[(EntityId, Vec2)],
        threshold: f32,
        state: &mut GameState,
        out: &mut Outbox,
    ) -> SweepReport {
        for &(id, position) in positions {
            if let Some(entity) = self.get_mut(id) {
                entity.position = position;
            }
        }

        let mut report = SweepReport::default();
        let mut escaped = Vec::new();
        self.entities.retain(|entity| {
            let gone = entity.alive && entity.position.y < threshold;
            if gone {
                escaped.push((entity.id, entity.kind));
            }
            !gone
        });

        for (id, kind) in escaped {
            out.command(Command::Remove { id });
            match kind {
                EntityKind::Target => {
                    log::debug!("Target {:?} escaped", id);
                    state.lose_life(out);
                    report.missed_targets.push(id);
                }
                EntityKind::Hazard => {
                    log::debug!("Hazard {:?} fell away", id);
                    report.expired_hazards.push(id);
                }
            }
        }
        report
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::events::GameEvent;

    const THRESHOLD: f32 = -140.0;

    fn add(registry: &mut ActiveEntityRegistry, kind: EntityKind) -> EntityId {
        let id = registry.next_entity_id();
        registry.register(Entity::new(id, kind, Vec2::new(300.0, -128.0), Vec2::ZERO, 0.0));
        id
    }

    fn fresh() -> (ActiveEntityRegistry, GameState, Outbox) {
        (
            ActiveEntityRegistry::new(),
            GameState::new(&Settings::default()),
            Outbox::default(),
        )
    }

    #[test]
    fn test_register_and_remove() {
        let (mut registry, _, _) = fresh();
        assert!(registry.is_empty());
        let a = add(&mut registry, EntityKind::Target);
        let b = add(&mut registry, EntityKind::Hazard);
        assert_eq!(registry.len(), 2);
        assert!(registry.has_live_hazard());
        assert_eq!(registry.remove(b).map(|e| e.kind), Some(EntityKind::Hazard));
        assert!(registry.remove(b).is_none());
        assert!(!registry.has_live_hazard());
        assert_eq!(registry.get(a).map(|e| e.id), Some(a));
    }

    #[test]
    fn test_missed_target_costs_one_life() {
        let (mut registry, mut state, mut out) = fresh();
        let target = add(&mut registry, EntityKind::Target);
        let other = add(&mut registry, EntityKind::Target);

        let report = registry.sweep(
            &[(target, Vec2::new(300.0, -141.0)), (other, Vec2::new(300.0, 200.0))],
            THRESHOLD,
            &mut state,
            &mut out,
        );

        assert_eq!(report.missed_targets, vec![target]);
        assert_eq!(report.removed(), 1);
        assert_eq!(state.lives, 2);
        assert_eq!(registry.len(), 1);
        assert!(out.events.contains(&GameEvent::LifeLost { remaining: 2 }));
        assert!(out.commands.contains(&Command::Remove { id: target }));
    }

    #[test]
    fn test_missed_hazard_is_free() {
        let (mut registry, mut state, mut out) = fresh();
        let hazard = add(&mut registry, EntityKind::Hazard);
        let report = registry.sweep(
            &[(hazard, Vec2::new(10.0, -500.0))],
            THRESHOLD,
            &mut state,
            &mut out,
        );
        assert_eq!(report.expired_hazards, vec![hazard]);
        assert_eq!(state.lives, 3);
        assert!(registry.is_empty());
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let (mut registry, mut state, mut out) = fresh();
        let target = add(&mut registry, EntityKind::Target);
        let report = registry.sweep(
            &[(target, Vec2::new(0.0, THRESHOLD))],
            THRESHOLD,
            &mut state,
            &mut out,
        );
        assert_eq!(report.removed(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unreported_entities_keep_last_position() {
        let (mut registry, mut state, mut out) = fresh();
        let target = add(&mut registry, EntityKind::Target);
        registry.sweep(&[(target, Vec2::new(1.0, 400.0))], THRESHOLD, &mut state, &mut out);
        registry.sweep(&[], THRESHOLD, &mut state, &mut out);
        assert_eq!(registry.get(target).map(|e| e.position), Some(Vec2::new(1.0, 400.0)));
    }

    #[test]
    fn test_three_misses_end_game() {
        let (mut registry, mut state, mut out) = fresh();
        let ids: Vec<_> = (0..3).map(|_| add(&mut registry, EntityKind::Target)).collect();
        let below: Vec<_> = ids.iter().map(|&id| (id, Vec2::new(0.0, -200.0))).collect();
        registry.sweep(&below, THRESHOLD, &mut state, &mut out);
        assert_eq!(state.lives, 0);
        assert_eq!(state.end_cause(), Some(false));
    }
}
