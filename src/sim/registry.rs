//! Target registry
//!
//! Owned by the level session and kept up to date as targets come and go,
//! so completion checks never scan the scene. Iteration is ordered by id.

use std::collections::BTreeMap;

use super::beam::TargetLookup;
use super::scene::EntityId;
use super::target::Target;
use crate::color::{Color, ColorFilter};

#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<EntityId, Target>,
    by_color: BTreeMap<Color, Vec<EntityId>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a target, returning the one it replaced
    pub fn insert(&mut self, target: Target) -> Option<Target> {
        let replaced = self.remove(target.id);
        if let Some(color) = target.required_color() {
            let ids = self.by_color.entry(color).or_default();
            if let Err(pos) = ids.binary_search(&target.id) {
                ids.insert(pos, target.id);
            }
        }
        self.targets.insert(target.id, target);
        replaced
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Target> {
        let target = self.targets.remove(&id)?;
        if let Some(color) = target.required_color() {
            if let Some(ids) = self.by_color.get_mut(&color) {
                ids.retain(|t| *t != id);
                if ids.is_empty() {
                    self.by_color.remove(&color);
                }
            }
        }
        Some(target)
    }

    pub fn get(&self, id: EntityId) -> Option<&Target> {
        self.targets.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Target> {
        self.targets.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.targets.values_mut()
    }

    /// Targets that require exactly `color` (accept-any targets excluded)
    pub fn with_color(&self, color: Color) -> impl Iterator<Item = &Target> {
        self.by_color
            .get(&color)
            .into_iter()
            .flatten()
            .filter_map(|id| self.targets.get(id))
    }

    pub fn count_with_color(&self, color: Color) -> usize {
        self.by_color.get(&color).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.targets.values().filter(|t| t.is_active()).count()
    }
}

impl TargetLookup for TargetRegistry {
    fn filter_for(&self, entity: EntityId) -> Option<ColorFilter> {
        self.targets.get(&entity).map(|t| t.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TargetRegistry {
        let mut reg = TargetRegistry::new();
        reg.insert(Target::new(EntityId(3), Color::Red.into()));
        reg.insert(Target::new(EntityId(1), Color::Red.into()));
        reg.insert(Target::new(EntityId(2), Color::Blue.into()));
        reg.insert(Target::new(EntityId(4), ColorFilter::Any));
        reg
    }

    #[test]
    fn test_color_index() {
        let reg = registry();
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.count_with_color(Color::Red), 2);
        assert_eq!(reg.count_with_color(Color::Blue), 1);
        assert_eq!(reg.count_with_color(Color::Green), 0);
        let reds: Vec<_> = reg.with_color(Color::Red).map(|t| t.id).collect();
        assert_eq!(reds, vec![EntityId(1), EntityId(3)]);
    }

    #[test]
    fn test_iteration_ordered_by_id() {
        let reg = registry();
        let ids: Vec<_> = reg.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_replace_moves_color_bucket() {
        let mut reg = registry();
        let old = reg.insert(Target::new(EntityId(3), Color::Green.into()));
        assert_eq!(old.and_then(|t| t.required_color()), Some(Color::Red));
        assert_eq!(reg.count_with_color(Color::Red), 1);
        assert_eq!(reg.count_with_color(Color::Green), 1);
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn test_remove() {
        let mut reg = registry();
        assert!(reg.remove(EntityId(2)).is_some());
        assert!(reg.remove(EntityId(2)).is_none());
        assert_eq!(reg.count_with_color(Color::Blue), 0);
        assert_eq!(reg.filter_for(EntityId(2)), None);
        assert_eq!(reg.filter_for(EntityId(4)), Some(ColorFilter::Any));
    }
}
