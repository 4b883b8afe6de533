//! Beam targets
//!
//! A target is lit only while it keeps receiving matching hits. Once the
//! last matching hit is older than the staleness threshold it drops back to
//! inactive on its own.

use serde::{Deserialize, Serialize};

use super::clock::SimTime;
use super::scene::EntityId;
use crate::color::{Color, ColorFilter, matches};

/// Activation edge produced by a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetTransition {
    Activated,
    Deactivated,
}

/// Result of reporting one beam hit to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Inactive -> Active
    Activated,
    /// Matching hit on an already active target (no event)
    Sustained,
    /// Wrong color while active: Active -> Inactive
    Deactivated,
    /// Wrong color while inactive: no state change
    Rejected,
}

impl HitOutcome {
    pub fn transition(self) -> Option<TargetTransition> {
        match self {
            HitOutcome::Activated => Some(TargetTransition::Activated),
            HitOutcome::Deactivated => Some(TargetTransition::Deactivated),
            HitOutcome::Sustained | HitOutcome::Rejected => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: EntityId,
    pub filter: ColorFilter,
    active: bool,
    /// Time of the last matching hit
    last_hit: Option<SimTime>,
}

impl Target {
    pub fn new(id: EntityId, filter: ColorFilter) -> Self {
        Self {
            id,
            filter,
            active: false,
            last_hit: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_hit(&self) -> Option<SimTime> {
        self.last_hit
    }

    /// Color this target insists on (`None` for accept-any targets)
    pub fn required_color(&self) -> Option<Color> {
        self.filter.required()
    }

    /// Apply a beam hit of `color` at time `now`
    pub fn report_hit(&mut self, color: Color, now: SimTime) -> HitOutcome {
        if matches(color, self.filter) {
            self.last_hit = Some(now);
            if self.active {
                HitOutcome::Sustained
            } else {
                self.active = true;
                HitOutcome::Activated
            }
        } else if self.active {
            self.active = false;
            HitOutcome::Deactivated
        } else {
            HitOutcome::Rejected
        }
    }

    /// Deactivate if the last matching hit is more than `threshold` old
    pub fn check_staleness(&mut self, now: SimTime, threshold: SimTime) -> Option<TargetTransition> {
        if !self.active {
            return None;
        }
        let stale = match self.last_hit {
            Some(t) => now - t > threshold,
            None => true,
        };
        if stale {
            self.active = false;
            Some(TargetTransition::Deactivated)
        } else {
            None
        }
    }

    /// Drop to inactive immediately (e.g. the sustaining emitter was switched off)
    pub fn force_deactivate(&mut self) -> Option<TargetTransition> {
        if self.active {
            self.active = false;
            Some(TargetTransition::Deactivated)
        } else {
            None
        }
    }
}
