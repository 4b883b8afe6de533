//! Fixed timestep simulation tick
//!
//! One tick runs four phases in a fixed order so the gate never reacts to
//! half-updated data:
//! 1. trace every active emitter and report hits
//! 2. expire stale targets
//! 3. re-evaluate completion (only if some target changed)
//! 4. apply gate transitions, player toggles, and advance the door animation

use std::collections::BTreeMap;

use super::beam::{BeamEnd, trace_beam};
use super::events::EngineEvent;
use super::gate::GateEvent;
use super::scene::EntityId;
use super::session::{EngineContext, LevelSession};
use super::target::HitOutcome;
use crate::color::{Color, matches};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player interacted with the gate
    pub toggle_gate: bool,
    /// Emitters switched on/off by the player this tick
    pub emitter_toggles: Vec<(EntityId, bool)>,
}

/// Advance the level by one tick at the context clock's current time
pub fn tick(session: &mut LevelSession, ctx: &EngineContext, input: &TickInput) -> Vec<EngineEvent> {
    let now = ctx.clock.now();
    let mut events = Vec::new();

    if !session.started {
        session.start_into(ctx, &mut events);
    }
    session.tick_count += 1;

    for &(id, active) in &input.emitter_toggles {
        session.set_emitter_active_into(id, active, now, ctx.collectables, &mut events);
    }

    // --- Phase 1: beams ---
    let epsilon = session.settings.reflection_epsilon;
    let mut beams = Vec::with_capacity(session.emitters.len());
    let mut hits = Vec::new();
    for emitter in session.emitters.iter().filter(|e| e.is_active()) {
        let beam = trace_beam(emitter, ctx.scene, &session.targets, epsilon);
        let fresh = session.contacts.get(&emitter.id) != Some(&beam.end);
        hits.push((emitter.id, emitter.color, beam.end, fresh));
        beams.push(beam);
    }
    session.beams = beams;

    // Beams landing on the same target are resolved together, once per target
    let mut target_hits: BTreeMap<EntityId, Vec<(Color, bool)>> = BTreeMap::new();
    for (emitter, color, end, fresh) in hits {
        match end {
            BeamEnd::HitTarget(target) | BeamEnd::HitOpaque { wrong_color: Some(target) } => {
                target_hits.entry(target).or_default().push((color, fresh));
            }
            BeamEnd::HitAbsorber(absorber) if fresh => {
                if let Some(a) = session.absorbers.get_mut(&absorber).filter(|a| !a.is_destroyed()) {
                    let destroyed = a.absorb();
                    events.push(EngineEvent::AbsorberHit {
                        absorber,
                        remaining: a.remaining(),
                    });
                    if destroyed {
                        log::info!("absorber {} destroyed after {} hits", absorber, a.hits);
                        events.push(EngineEvent::AbsorberDestroyed { absorber });
                    }
                }
            }
            _ => {}
        }
        session.contacts.insert(emitter, end);
    }

    for (target, colors) in target_hits {
        let Some(t) = session.targets.get_mut(target) else {
            continue;
        };
        let filter = t.filter;
        // A matching beam wins; a wrong color only counts when nothing matched
        let Some(&(color, _)) = colors.iter().find(|(c, _)| matches(*c, filter)).or(colors.first()) else {
            continue;
        };
        let outcome = t.report_hit(color, now);

        for &(c, fresh) in &colors {
            if fresh && !matches(c, filter) {
                events.push(EngineEvent::WrongColorHit { target, color: c });
            }
        }
        if let Some(transition) = outcome.transition() {
            session.record_transition(target, transition, &mut events);
        }
        if outcome == HitOutcome::Deactivated {
            log::debug!("target {} knocked out by {:?} beam", target, color);
        }
    }
    let active_emitters: Vec<EntityId> = session.emitters.iter().filter(|e| e.is_active()).map(|e| e.id).collect();
    session.contacts.retain(|id, _| active_emitters.contains(id));

    // --- Phase 2: staleness ---
    let threshold = session.settings.staleness_threshold;
    let mut stale = Vec::new();
    for target in session.targets.iter_mut() {
        if let Some(transition) = target.check_staleness(now, threshold) {
            stale.push((target.id, transition));
        }
    }
    for (target, transition) in stale {
        log::debug!("target {} went stale", target);
        session.record_transition(target, transition, &mut events);
    }

    // --- Phase 3 + 4a: completion drives lock/unlock ---
    session.apply_completion(now, ctx.collectables, &mut events);

    // --- Phase 4b: player toggle and animation ---
    let mut gate_events: Vec<GateEvent> = Vec::new();
    if input.toggle_gate {
        session.gate.toggle(now, &mut gate_events);
    }
    session.gate.update(now, &mut gate_events);
    events.extend(gate_events.into_iter().map(EngineEvent::Gate));

    session.bus.dispatch(&events);
    events
}
