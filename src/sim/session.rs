//! Level session
//!
//! Everything the engine mutates for one loaded level: emitters, targets,
//! absorbers, the exit gate and the completion state. Collaborators are
//! passed in per call through [`EngineContext`]; the session holds no
//! references to the outside world.

use std::collections::BTreeMap;

use super::absorber::Absorber;
use super::beam::{Beam, BeamEnd, Emitter};
use super::clock::{SimClock, SimTime};
use super::completion::{
    CollectableTracker, CompletionEvaluator, CompletionTransition, LevelRequirement, unbacked_colors,
};
use super::events::{EngineEvent, EventBus, SubscriptionId};
use super::gate::{Gate, GateConfig, GateEvent};
use super::registry::TargetRegistry;
use super::scene::{EntityId, SceneQuery};
use super::target::{Target, TargetTransition};
use crate::settings::EngineSettings;

/// Collaborators the engine queries during a call
pub struct EngineContext<'a> {
    pub scene: &'a dyn SceneQuery,
    pub collectables: &'a dyn CollectableTracker,
    pub clock: &'a dyn SimClock,
}

impl<'a> EngineContext<'a> {
    pub fn new(
        scene: &'a dyn SceneQuery,
        collectables: &'a dyn CollectableTracker,
        clock: &'a dyn SimClock,
    ) -> Self {
        Self {
            scene,
            collectables,
            clock,
        }
    }
}

#[derive(Debug)]
pub struct LevelSession {
    pub name: String,
    pub settings: EngineSettings,
    pub requirement: LevelRequirement,
    /// Sorted by id for deterministic trace order
    pub(crate) emitters: Vec<Emitter>,
    pub(crate) targets: TargetRegistry,
    pub(crate) absorbers: BTreeMap<EntityId, Absorber>,
    pub(crate) gate: Gate,
    pub(crate) evaluator: CompletionEvaluator,
    pub(crate) bus: EventBus,
    /// Beams from the most recent tick
    pub(crate) beams: Vec<Beam>,
    /// How each emitter's beam ended on the previous tick
    pub(crate) contacts: BTreeMap<EntityId, BeamEnd>,
    pub(crate) completion_dirty: bool,
    pub(crate) started: bool,
    pub(crate) tick_count: u64,
}

impl LevelSession {
    pub fn new(
        name: impl Into<String>,
        requirement: LevelRequirement,
        gate: GateConfig,
        settings: EngineSettings,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            requirement,
            emitters: Vec::new(),
            targets: TargetRegistry::new(),
            absorbers: BTreeMap::new(),
            gate: Gate::new(gate),
            evaluator: CompletionEvaluator::new(),
            bus: EventBus::new(),
            beams: Vec::new(),
            contacts: BTreeMap::new(),
            completion_dirty: true,
            started: false,
            tick_count: 0,
        }
    }

    // --- Entities ---

    pub fn add_emitter(&mut self, emitter: Emitter) {
        self.emitters.retain(|e| e.id != emitter.id);
        self.emitters.push(emitter);
        self.emitters.sort_by_key(|e| e.id);
    }

    pub fn add_target(&mut self, target: Target) {
        self.targets.insert(target);
        self.completion_dirty = true;
    }

    /// Remove a target and every listener tied to it
    pub fn remove_target(&mut self, id: EntityId) -> Option<Target> {
        let target = self.targets.remove(id)?;
        let dropped = self.bus.unsubscribe_owner(id);
        if dropped > 0 {
            log::debug!("dropped {} listeners owned by target {}", dropped, id);
        }
        self.contacts.retain(|_, end| *end != BeamEnd::HitTarget(id));
        self.completion_dirty = true;
        Some(target)
    }

    pub fn add_absorber(&mut self, absorber: Absorber) {
        self.absorbers.insert(absorber.id, absorber);
    }

    // --- Queries ---

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Mutable access for moving or re-aiming an emitter; on/off goes
    /// through [`LevelSession::set_emitter_active`]
    pub fn emitter_mut(&mut self, id: EntityId) -> Option<&mut Emitter> {
        self.emitters.iter_mut().find(|e| e.id == id)
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn target(&self, id: EntityId) -> Option<&Target> {
        self.targets.get(id)
    }

    pub fn absorber(&self, id: EntityId) -> Option<&Absorber> {
        self.absorbers.get(&id)
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Beams traced on the last tick, in emitter order
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn is_satisfied(&self) -> bool {
        self.evaluator.is_satisfied()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // --- Subscriptions ---

    pub fn subscribe<F>(&mut self, owner: Option<EntityId>, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.bus.subscribe(owner, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // --- Level lifecycle ---

    /// Initial completion check. Runs automatically on the first tick.
    pub fn start(&mut self, ctx: &EngineContext) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.start_into(ctx, &mut events);
        self.bus.dispatch(&events);
        events
    }

    pub(crate) fn start_into(&mut self, ctx: &EngineContext, events: &mut Vec<EngineEvent>) {
        if self.started {
            return;
        }
        self.started = true;

        for color in unbacked_colors(&self.requirement, &self.targets) {
            log::warn!(
                "level '{}' requires {} but has no {} targets; it can never complete",
                self.name,
                color.as_str(),
                color.as_str()
            );
        }
        log::info!(
            "level '{}' started: {} emitters, {} targets, {} absorbers",
            self.name,
            self.emitters.len(),
            self.targets.len(),
            self.absorbers.len()
        );

        self.completion_dirty = true;
        self.apply_completion(ctx.clock.now(), ctx.collectables, events);
    }

    /// Switch an emitter on or off
    ///
    /// Turning one off releases any target only it was lighting, and the
    /// completion/gate consequences happen in this call.
    pub fn set_emitter_active(&mut self, id: EntityId, active: bool, ctx: &EngineContext) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.set_emitter_active_into(id, active, ctx.clock.now(), ctx.collectables, &mut events);
        self.bus.dispatch(&events);
        events
    }

    pub(crate) fn set_emitter_active_into(
        &mut self,
        id: EntityId,
        active: bool,
        now: SimTime,
        collectables: &dyn CollectableTracker,
        events: &mut Vec<EngineEvent>,
    ) {
        let Some(emitter) = self.emitters.iter_mut().find(|e| e.id == id) else {
            log::warn!("toggle for unknown emitter {}", id);
            return;
        };
        if emitter.active == active {
            return;
        }
        emitter.active = active;
        log::debug!("emitter {} {}", id, if active { "on" } else { "off" });
        if active {
            return;
        }

        self.beams.retain(|b| b.emitter != id);
        if let Some(BeamEnd::HitTarget(target)) = self.contacts.remove(&id) {
            let still_lit = self.contacts.iter().any(|(other, end)| {
                *end == BeamEnd::HitTarget(target)
                    && self.emitters.iter().any(|e| e.id == *other && e.is_active())
            });
            if !still_lit {
                if let Some(t) = self.targets.get_mut(target) {
                    if t.force_deactivate().is_some() {
                        events.push(EngineEvent::TargetDeactivated { target });
                        self.completion_dirty = true;
                    }
                }
            }
        }
        self.apply_completion(now, collectables, events);
    }

    /// Re-check completion after collectable progress changed
    pub fn notify_collectables_changed(&mut self, ctx: &EngineContext) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.completion_dirty = true;
        self.apply_completion(ctx.clock.now(), ctx.collectables, &mut events);
        self.bus.dispatch(&events);
        events
    }

    /// Direct player interaction with the gate
    pub fn toggle_gate(&mut self, ctx: &EngineContext) -> Vec<EngineEvent> {
        let mut gate_events = Vec::new();
        self.gate.toggle(ctx.clock.now(), &mut gate_events);
        let events: Vec<_> = gate_events.into_iter().map(EngineEvent::Gate).collect();
        self.bus.dispatch(&events);
        events
    }

    pub(crate) fn record_transition(&mut self, target: EntityId, transition: TargetTransition, events: &mut Vec<EngineEvent>) {
        self.completion_dirty = true;
        events.push(match transition {
            TargetTransition::Activated => EngineEvent::TargetActivated { target },
            TargetTransition::Deactivated => EngineEvent::TargetDeactivated { target },
        });
    }

    /// Re-evaluate if anything changed and drive the gate on an edge
    pub(crate) fn apply_completion(
        &mut self,
        now: SimTime,
        collectables: &dyn CollectableTracker,
        events: &mut Vec<EngineEvent>,
    ) {
        if !self.completion_dirty {
            return;
        }
        self.completion_dirty = false;

        let Some(transition) = self.evaluator.update(&self.requirement, &self.targets, collectables) else {
            return;
        };
        log::info!("level '{}' completion: {:?}", self.name, transition);
        events.push(EngineEvent::Completion(transition));

        let mut gate_events: Vec<GateEvent> = Vec::new();
        match transition {
            CompletionTransition::Satisfied => self.gate.unlock(now, &mut gate_events),
            CompletionTransition::Unsatisfied => self.gate.lock(now, &mut gate_events),
        };
        events.extend(gate_events.into_iter().map(EngineEvent::Gate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::sim::clock::ManualClock;
    use crate::sim::completion::FixedCollectables;
    use crate::sim::gate::{DoorState, LockState};
    use crate::sim::scene::{EntityKind, Shape, StaticScene};
    use crate::sim::tick::{TickInput, tick};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_empty_requirement_unlocks_at_start() {
        let mut session = LevelSession::new(
            "open",
            LevelRequirement::default(),
            GateConfig::default(),
            EngineSettings::default(),
        );
        let scene = StaticScene::new();
        let clock = ManualClock::new();
        let collectables = FixedCollectables(true);
        let ctx = EngineContext::new(&scene, &collectables, &clock);

        let events = session.start(&ctx);
        assert!(session.is_satisfied());
        assert_eq!(session.gate().lock_state(), LockState::Unlocked);
        assert!(events.contains(&EngineEvent::Completion(CompletionTransition::Satisfied)));
        assert!(events.contains(&EngineEvent::Gate(GateEvent::Unlocked)));

        // Starting twice is a no-op
        assert!(session.start(&ctx).is_empty());
    }

    #[test]
    fn test_unbacked_color_stays_locked() {
        let mut session = LevelSession::new(
            "broken",
            LevelRequirement::colors([Color::Pink]),
            GateConfig::default(),
            EngineSettings::default(),
        );
        session.add_target(Target::new(EntityId(1), Color::Red.into()));
        let scene = StaticScene::new();
        let clock = ManualClock::new();
        let collectables = FixedCollectables(true);
        let ctx = EngineContext::new(&scene, &collectables, &clock);

        assert!(session.start(&ctx).is_empty());
        assert!(!session.is_satisfied());
        assert!(session.gate().is_locked());
    }

    #[test]
    fn test_collectables_notification_unlocks() {
        let mut session = LevelSession::new(
            "pickups",
            LevelRequirement {
                require_all_collectables: true,
                ..LevelRequirement::default()
            },
            GateConfig::default(),
            EngineSettings::default(),
        );
        let scene = StaticScene::new();
        let clock = ManualClock::new();

        let pending = FixedCollectables(false);
        session.start(&EngineContext::new(&scene, &pending, &clock));
        assert!(!session.is_satisfied());

        let done = FixedCollectables(true);
        let events = session.notify_collectables_changed(&EngineContext::new(&scene, &done, &clock));
        assert!(session.is_satisfied());
        assert!(events.contains(&EngineEvent::Gate(GateEvent::Unlocked)));
    }

    #[test]
    fn test_remove_target_drops_owned_listeners() {
        let mut session = LevelSession::new(
            "listeners",
            LevelRequirement::default(),
            GateConfig::default(),
            EngineSettings::default(),
        );
        session.add_target(Target::new(EntityId(1), Color::Red.into()));
        session.subscribe(Some(EntityId(1)), |_| {});
        session.subscribe(None, |_| {});
        assert!(session.remove_target(EntityId(1)).is_some());
        assert_eq!(session.bus.len(), 1);
        assert!(session.remove_target(EntityId(1)).is_none());
    }

    #[test]
    fn test_set_emitter_active_directly() {
        let emitter = EntityId(1);
        let target = EntityId(10);
        let mut session = LevelSession::new(
            "switch",
            LevelRequirement::colors([Color::Red]),
            GateConfig::default(),
            EngineSettings::default(),
        );
        session.add_emitter(Emitter::new(emitter, Vec3::ZERO, Vec3::X, Color::Red));
        session.add_target(Target::new(target, Color::Red.into()));
        let mut scene = StaticScene::new();
        scene.add(target, EntityKind::Target, Vec3::new(5.0, 0.0, 0.0), Shape::Sphere { radius: 1.0 });
        let mut clock = ManualClock::new();
        let collectables = FixedCollectables(true);

        clock.advance(0.0625);
        tick(&mut session, &EngineContext::new(&scene, &collectables, &clock), &TickInput::default());
        assert!(session.is_satisfied());

        let ctx = EngineContext::new(&scene, &collectables, &clock);
        let events = session.set_emitter_active(emitter, false, &ctx);
        assert_eq!(
            events,
            vec![
                EngineEvent::TargetDeactivated { target },
                EngineEvent::Completion(CompletionTransition::Unsatisfied),
                EngineEvent::Gate(GateEvent::Locked),
                EngineEvent::Gate(GateEvent::ClosingStarted),
            ]
        );
        assert!(!session.emitters()[0].is_active());
        assert!(session.beams().is_empty());

        // Repeating the same state, or naming an unknown emitter, changes nothing
        assert!(session.set_emitter_active(emitter, false, &ctx).is_empty());
        assert!(session.set_emitter_active(EntityId(99), true, &ctx).is_empty());

        assert!(session.set_emitter_active(emitter, true, &ctx).is_empty());
        assert!(session.emitters()[0].is_active());
    }

    #[test]
    fn test_toggle_gate_dispatches_to_subscribers() {
        let mut session = LevelSession::new(
            "door",
            LevelRequirement::default(),
            GateConfig {
                start_unlocked: true,
                ..GateConfig::default()
            },
            EngineSettings::default(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(None, move |e| sink.borrow_mut().push(*e));

        let scene = StaticScene::new();
        let clock = ManualClock::new();
        let collectables = FixedCollectables(true);
        let ctx = EngineContext::new(&scene, &collectables, &clock);

        let events = session.toggle_gate(&ctx);
        assert_eq!(events, vec![EngineEvent::Gate(GateEvent::OpeningStarted)]);
        assert_eq!(*seen.borrow(), events);
        assert_eq!(session.gate().door_state(), DoorState::Animating);
    }

    #[test]
    fn test_toggle_gate_refused_while_locked() {
        let mut session = LevelSession::new(
            "shut",
            LevelRequirement::colors([Color::Red]),
            GateConfig::default(),
            EngineSettings::default(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(None, move |e| sink.borrow_mut().push(*e));

        let scene = StaticScene::new();
        let clock = ManualClock::new();
        let collectables = FixedCollectables(true);
        let events = session.toggle_gate(&EngineContext::new(&scene, &collectables, &clock));
        assert_eq!(events, vec![EngineEvent::Gate(GateEvent::Refused)]);
        assert_eq!(*seen.borrow(), events);
        assert_eq!(session.gate().door_state(), DoorState::Closed);
    }
}
