//! Engine events and subscriptions
//!
//! Each level session owns one [`EventBus`]. Subscriptions are plain handles;
//! a subscription tied to an entity is dropped when that entity is removed,
//! so no listener outlives what it was listening for.

use serde::{Deserialize, Serialize};

use super::completion::CompletionTransition;
use super::gate::GateEvent;
use super::scene::EntityId;
use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    TargetActivated { target: EntityId },
    TargetDeactivated { target: EntityId },
    /// Transient feedback: a beam of the wrong color reached a target
    WrongColorHit { target: EntityId, color: Color },
    AbsorberHit { absorber: EntityId, remaining: u32 },
    AbsorberDestroyed { absorber: EntityId },
    Completion(CompletionTransition),
    Gate(GateEvent),
}

impl EngineEvent {
    /// Entity the event is about, if any
    pub fn subject(&self) -> Option<EntityId> {
        match *self {
            EngineEvent::TargetActivated { target }
            | EngineEvent::TargetDeactivated { target }
            | EngineEvent::WrongColorHit { target, .. } => Some(target),
            EngineEvent::AbsorberHit { absorber, .. } | EngineEvent::AbsorberDestroyed { absorber } => {
                Some(absorber)
            }
            EngineEvent::Completion(_) | EngineEvent::Gate(_) => None,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&EngineEvent)>;

struct Subscription {
    id: SubscriptionId,
    owner: Option<EntityId>,
    callback: Callback,
}

/// Observer registry, dispatched in subscription order
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. With an `owner`, the listener is removed along with that entity.
    pub fn subscribe<F>(&mut self, owner: Option<EntityId>, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            owner,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Drop every listener owned by `owner`, returning how many went
    pub fn unsubscribe_owner(&mut self, owner: EntityId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.owner != Some(owner));
        before - self.subscriptions.len()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn dispatch(&mut self, events: &[EngineEvent]) {
        for event in events {
            for sub in &mut self.subscriptions {
                (sub.callback)(event);
            }
        }
    }
}
