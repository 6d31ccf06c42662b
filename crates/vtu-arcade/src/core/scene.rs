use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;
use crate::components::transient::{TransientEntity, TransientKind};

/// Transient entity storage using a flat Vec.
/// Sized for the handful of obstacles, pickups and projectiles on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    entities: Vec<TransientEntity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(64),
        }
    }

    pub fn spawn(&mut self, entity: TransientEntity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<TransientEntity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&TransientEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut TransientEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransientEntity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TransientEntity> {
        self.entities.iter_mut()
    }

    /// Keep only entities matching the predicate. Spawn order is preserved.
    pub fn retain(&mut self, keep: impl FnMut(&TransientEntity) -> bool) {
        self.entities.retain(keep);
    }

    pub fn boss(&self) -> Option<&TransientEntity> {
        self.entities.iter().find(|e| e.is_boss())
    }

    pub fn boss_mut(&mut self) -> Option<&mut TransientEntity> {
        self.entities.iter_mut().find(|e| e.is_boss())
    }

    pub fn count_where(&self, pred: impl Fn(&TransientKind) -> bool) -> usize {
        self.entities.iter().filter(|e| pred(&e.kind)).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
