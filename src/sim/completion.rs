//! Level completion
//!
//! Folds the target registry against the level's requirement into a single
//! satisfied flag. The evaluator only remembers the last result so callers
//! can react to edges instead of levels.

use serde::{Deserialize, Serialize};

use super::registry::TargetRegistry;
use super::target::Target;
use crate::color::Color;

/// What a level demands before its exit unlocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequirement {
    /// Every target of each listed color must be lit
    #[serde(default)]
    pub required_colors: Vec<Color>,
    /// Used only when `required_colors` is empty
    #[serde(default)]
    pub require_all_targets: bool,
    #[serde(default)]
    pub require_all_collectables: bool,
}

impl LevelRequirement {
    pub fn colors(colors: impl IntoIterator<Item = Color>) -> Self {
        Self {
            required_colors: colors.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn all_targets() -> Self {
        Self {
            require_all_targets: true,
            ..Self::default()
        }
    }
}

/// Collectable progress, owned by whoever tracks pickups
pub trait CollectableTracker {
    fn all_collected(&self) -> bool;
}

/// Tracker with a fixed answer (levels without collectables use `FixedCollectables(true)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCollectables(pub bool);

impl CollectableTracker for FixedCollectables {
    fn all_collected(&self) -> bool {
        self.0
    }
}

/// Satisfied/unsatisfied edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionTransition {
    Satisfied,
    Unsatisfied,
}

/// Required colors that have no target at all in the registry
pub fn unbacked_colors(requirement: &LevelRequirement, targets: &TargetRegistry) -> Vec<Color> {
    requirement
        .required_colors
        .iter()
        .copied()
        .filter(|c| targets.count_with_color(*c) == 0)
        .collect()
}

/// Evaluate `requirement` against the current target states
///
/// A required color with zero targets fails closed.
pub fn evaluate(
    requirement: &LevelRequirement,
    targets: &TargetRegistry,
    collectables: &dyn CollectableTracker,
) -> bool {
    let targets_ok = if !requirement.required_colors.is_empty() {
        requirement.required_colors.iter().all(|&color| {
            targets.count_with_color(color) > 0 && targets.with_color(color).all(Target::is_active)
        })
    } else if requirement.require_all_targets {
        targets.iter().all(Target::is_active)
    } else {
        true
    };

    targets_ok && (!requirement.require_all_collectables || collectables.all_collected())
}

/// Tracks the last evaluation to report only edges
#[derive(Debug, Clone, Default)]
pub struct CompletionEvaluator {
    satisfied: bool,
}

impl CompletionEvaluator {
    pub fn new() -> Self {
        Self { satisfied: false }
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Re-evaluate and return the edge, if the result changed
    pub fn update(
        &mut self,
        requirement: &LevelRequirement,
        targets: &TargetRegistry,
        collectables: &dyn CollectableTracker,
    ) -> Option<CompletionTransition> {
        let now = evaluate(requirement, targets, collectables);
        if now == self.satisfied {
            return None;
        }
        self.satisfied = now;
        Some(if now {
            CompletionTransition::Satisfied
        } else {
            CompletionTransition::Unsatisfied
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorFilter;
    use crate::sim::scene::EntityId;

    const ALL: FixedCollectables = FixedCollectables(true);

    /// Two red targets (1, 2) and one blue (3)
    fn red_red_blue() -> TargetRegistry {
        let mut reg = TargetRegistry::new();
        reg.insert(Target::new(EntityId(1), Color::Red.into()));
        reg.insert(Target::new(EntityId(2), Color::Red.into()));
        reg.insert(Target::new(EntityId(3), Color::Blue.into()));
        reg
    }

    fn light(reg: &mut TargetRegistry, id: u32, color: Color) {
        reg.get_mut(EntityId(id)).unwrap().report_hit(color, 0.0);
    }

    #[test]
    fn test_required_colors_need_every_matching_target() {
        let req = LevelRequirement::colors([Color::Red, Color::Blue]);
        let mut reg = red_red_blue();
        assert!(!evaluate(&req, &reg, &ALL));

        light(&mut reg, 1, Color::Red);
        light(&mut reg, 3, Color::Blue);
        assert!(!evaluate(&req, &reg, &ALL));

        light(&mut reg, 2, Color::Red);
        assert!(evaluate(&req, &reg, &ALL));

        reg.get_mut(EntityId(2)).unwrap().force_deactivate();
        assert!(!evaluate(&req, &reg, &ALL));
    }

    #[test]
    fn test_required_color_without_targets_fails_closed() {
        let req = LevelRequirement::colors([Color::Green]);
        let reg = red_red_blue();
        assert!(!evaluate(&req, &reg, &ALL));
        assert_eq!(unbacked_colors(&req, &reg), vec![Color::Green]);
    }

    #[test]
    fn test_required_colors_ignore_other_targets() {
        let req = LevelRequirement::colors([Color::Blue]);
        let mut reg = red_red_blue();
        reg.insert(Target::new(EntityId(4), ColorFilter::Any));
        light(&mut reg, 3, Color::Blue);
        assert!(evaluate(&req, &reg, &ALL));
    }

    #[test]
    fn test_require_all_targets() {
        let req = LevelRequirement::all_targets();
        let mut reg = red_red_blue();
        light(&mut reg, 1, Color::Red);
        light(&mut reg, 2, Color::Red);
        assert!(!evaluate(&req, &reg, &ALL));
        light(&mut reg, 3, Color::Blue);
        assert!(evaluate(&req, &reg, &ALL));
    }

    #[test]
    fn test_empty_requirement_always_passes() {
        let req = LevelRequirement::default();
        assert!(evaluate(&req, &red_red_blue(), &ALL));
        assert!(evaluate(&req, &TargetRegistry::new(), &ALL));
    }

    #[test]
    fn test_collectables_are_anded() {
        let req = LevelRequirement {
            require_all_collectables: true,
            ..LevelRequirement::default()
        };
        let reg = TargetRegistry::new();
        assert!(!evaluate(&req, &reg, &FixedCollectables(false)));
        assert!(evaluate(&req, &reg, &FixedCollectables(true)));

        // Collectables alone never rescue unlit targets
        let req = LevelRequirement {
            require_all_targets: true,
            require_all_collectables: true,
            ..LevelRequirement::default()
        };
        assert!(!evaluate(&req, &red_red_blue(), &FixedCollectables(true)));
    }

    #[test]
    fn test_evaluator_reports_edges_only() {
        let req = LevelRequirement::colors([Color::Blue]);
        let mut reg = red_red_blue();
        let mut eval = CompletionEvaluator::new();

        assert_eq!(eval.update(&req, &reg, &ALL), None);
        light(&mut reg, 3, Color::Blue);
        assert_eq!(eval.update(&req, &reg, &ALL), Some(CompletionTransition::Satisfied));
        assert_eq!(eval.update(&req, &reg, &ALL), None, "re-affirming must not re-fire");
        assert!(eval.is_satisfied());

        reg.get_mut(EntityId(3)).unwrap().force_deactivate();
        assert_eq!(eval.update(&req, &reg, &ALL), Some(CompletionTransition::Unsatisfied));
        assert!(!eval.is_satisfied());
    }
}
