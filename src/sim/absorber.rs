//! Beam absorbers
//!
//! An absorber soaks up beam hits until it reaches its limit, then is
//! destroyed and should be removed from the scene.

use serde::{Deserialize, Serialize};

use super::scene::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Absorber {
    pub id: EntityId,
    /// Hits taken so far
    pub hits: u32,
    /// Hits it can take before it is destroyed
    pub max_hits: u32,
    /// Any single hit destroys it
    #[serde(default)]
    pub fragile: bool,
    #[serde(default)]
    destroyed: bool,
}

impl Absorber {
    pub fn new(id: EntityId, max_hits: u32) -> Self {
        Self {
            id,
            hits: 0,
            max_hits: max_hits.max(1),
            fragile: false,
            destroyed: false,
        }
    }

    pub fn fragile(id: EntityId) -> Self {
        Self {
            fragile: true,
            ..Self::new(id, 1)
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Hits left before destruction
    pub fn remaining(&self) -> u32 {
        if self.destroyed {
            0
        } else if self.fragile {
            1
        } else {
            self.max_hits.saturating_sub(self.hits)
        }
    }

    /// Register a beam hit. Returns true on the hit that destroys it.
    pub fn absorb(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.hits = self.hits.saturating_add(1);
        if self.fragile || self.hits >= self.max_hits {
            self.destroyed = true;
            return true;
        }
        false
    }
}
