//! Exit gate
//!
//! Lock state and door position are independent: the gate can be unlocked
//! but still closed, or locked while it is swinging shut. Completion edges
//! drive `unlock`/`lock`; players drive `toggle`.

use serde::{Deserialize, Serialize};

use super::clock::SimTime;
use crate::consts::{GATE_ANIMATION_SECS, GATE_OPEN_ANGLE_DEG};
use crate::{lerp, smoothstep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    Locked,
    Unlocked,
}

/// Settled door position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPosition {
    Closed,
    Open,
}

/// Door state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    Closed,
    Open,
    Animating,
}

/// Gate notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateEvent {
    Unlocked,
    Locked,
    OpeningStarted,
    ClosingStarted,
    Opened,
    Closed,
    /// Toggle attempted while locked
    Refused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub start_unlocked: bool,
    /// Door angle when fully open (degrees)
    pub open_angle: f32,
    /// Length of an open/close swing (seconds)
    pub animation_secs: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            start_unlocked: false,
            open_angle: GATE_OPEN_ANGLE_DEG,
            animation_secs: GATE_ANIMATION_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Motion {
    Settled(DoorPosition),
    Animating {
        toward: DoorPosition,
        from_angle: f32,
        started: SimTime,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub config: GateConfig,
    lock: LockState,
    motion: Motion,
    /// Current door angle (degrees, 0 = closed)
    angle: f32,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        let lock = if config.start_unlocked {
            LockState::Unlocked
        } else {
            LockState::Locked
        };
        Self {
            config,
            lock,
            motion: Motion::Settled(DoorPosition::Closed),
            angle: 0.0,
        }
    }

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    pub fn is_locked(&self) -> bool {
        self.lock == LockState::Locked
    }

    pub fn door_state(&self) -> DoorState {
        match self.motion {
            Motion::Settled(DoorPosition::Closed) => DoorState::Closed,
            Motion::Settled(DoorPosition::Open) => DoorState::Open,
            Motion::Animating { .. } => DoorState::Animating,
        }
    }

    /// Where the door is, or is heading
    pub fn heading(&self) -> DoorPosition {
        match self.motion {
            Motion::Settled(p) => p,
            Motion::Animating { toward, .. } => toward,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    fn angle_for(&self, position: DoorPosition) -> f32 {
        match position {
            DoorPosition::Closed => 0.0,
            DoorPosition::Open => self.config.open_angle,
        }
    }

    /// Unlock and start opening. No-op if already unlocked.
    pub fn unlock(&mut self, now: SimTime, events: &mut Vec<GateEvent>) -> bool {
        if self.lock == LockState::Unlocked {
            return false;
        }
        self.lock = LockState::Unlocked;
        events.push(GateEvent::Unlocked);
        log::info!("gate unlocked");
        self.open(now, events);
        true
    }

    /// Lock, closing the door if it is open or opening. No-op if already locked.
    pub fn lock(&mut self, now: SimTime, events: &mut Vec<GateEvent>) -> bool {
        if self.lock == LockState::Locked {
            return false;
        }
        self.lock = LockState::Locked;
        events.push(GateEvent::Locked);
        log::info!("gate locked");
        if self.heading() == DoorPosition::Open {
            self.close(now, events);
        }
        true
    }

    pub fn open(&mut self, now: SimTime, events: &mut Vec<GateEvent>) -> bool {
        self.swing(DoorPosition::Open, now, events)
    }

    pub fn close(&mut self, now: SimTime, events: &mut Vec<GateEvent>) -> bool {
        self.swing(DoorPosition::Closed, now, events)
    }

    fn swing(&mut self, toward: DoorPosition, now: SimTime, events: &mut Vec<GateEvent>) -> bool {
        if self.heading() == toward {
            return false;
        }
        self.motion = Motion::Animating {
            toward,
            from_angle: self.angle,
            started: now,
        };
        events.push(match toward {
            DoorPosition::Open => GateEvent::OpeningStarted,
            DoorPosition::Closed => GateEvent::ClosingStarted,
        });
        true
    }

    /// Player interaction. Refused while locked, ignored mid-swing.
    pub fn toggle(&mut self, now: SimTime, events: &mut Vec<GateEvent>) -> bool {
        if self.is_locked() {
            events.push(GateEvent::Refused);
            return false;
        }
        match self.motion {
            Motion::Animating { .. } => false,
            Motion::Settled(DoorPosition::Open) => self.close(now, events),
            Motion::Settled(DoorPosition::Closed) => self.open(now, events),
        }
    }

    /// Advance the swing animation to `now`
    pub fn update(&mut self, now: SimTime, events: &mut Vec<GateEvent>) {
        let Motion::Animating {
            toward,
            from_angle,
            started,
        } = self.motion
        else {
            return;
        };

        let t = if self.config.animation_secs > 0.0 {
            ((now - started) / self.config.animation_secs).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        let target_angle = self.angle_for(toward);

        if t >= 1.0 {
            self.angle = target_angle;
            self.motion = Motion::Settled(toward);
            events.push(match toward {
                DoorPosition::Open => GateEvent::Opened,
                DoorPosition::Closed => GateEvent::Closed,
            });
        } else {
            self.angle = lerp(from_angle, target_angle, smoothstep(t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_gate() -> Gate {
        Gate::new(GateConfig {
            start_unlocked: false,
            open_angle: 90.0,
            animation_secs: 1.0,
        })
    }

    #[test]
    fn test_initial_state() {
        let gate = quick_gate();
        assert_eq!(gate.lock_state(), LockState::Locked);
        assert_eq!(gate.door_state(), DoorState::Closed);
        assert_eq!(gate.angle(), 0.0);

        let open_gate = Gate::new(GateConfig {
            start_unlocked: true,
            ..GateConfig::default()
        });
        assert_eq!(open_gate.lock_state(), LockState::Unlocked);
        assert_eq!(open_gate.door_state(), DoorState::Closed);
    }

    #[test]
    fn test_unlock_opens_and_settles() {
        let mut gate = quick_gate();
        let mut events = Vec::new();
        assert!(gate.unlock(0.0, &mut events));
        assert_eq!(events, vec![GateEvent::Unlocked, GateEvent::OpeningStarted]);
        assert_eq!(gate.door_state(), DoorState::Animating);

        events.clear();
        gate.update(0.25, &mut events);
        assert!(gate.angle() < 45.0 * 0.5, "ease-in starts slow");
        gate.update(0.5, &mut events);
        assert!((gate.angle() - 45.0).abs() < 1e-3, "ease-in-out is symmetric at the midpoint");

        gate.update(1.0, &mut events);
        assert_eq!(gate.angle(), 90.0);
        assert_eq!(gate.door_state(), DoorState::Open);
        assert_eq!(events, vec![GateEvent::Opened]);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut gate = quick_gate();
        let mut events = Vec::new();
        gate.unlock(0.0, &mut events);
        gate.update(0.3, &mut events);
        let angle = gate.angle();

        events.clear();
        assert!(!gate.unlock(0.3, &mut events));
        assert!(events.is_empty());
        gate.update(0.3, &mut events);
        assert_eq!(gate.angle(), angle, "animation must not restart");
    }

    #[test]
    fn test_lock_closes_open_gate() {
        let mut gate = quick_gate();
        let mut events = Vec::new();
        gate.unlock(0.0, &mut events);
        gate.update(2.0, &mut events);

        events.clear();
        assert!(gate.lock(2.0, &mut events));
        assert_eq!(events, vec![GateEvent::Locked, GateEvent::ClosingStarted]);
        gate.update(3.0, &mut events);
        assert_eq!(gate.door_state(), DoorState::Closed);
        assert_eq!(gate.angle(), 0.0);
        assert!(!gate.lock(3.0, &mut events));
    }

    #[test]
    fn test_lock_while_opening_reverses_from_current_angle() {
        let mut gate = quick_gate();
        let mut events = Vec::new();
        gate.unlock(0.0, &mut events);
        gate.update(0.5, &mut events);
        gate.lock(0.5, &mut events);
        assert_eq!(gate.heading(), DoorPosition::Closed);
        gate.update(0.5, &mut events);
        assert!((gate.angle() - 45.0).abs() < 1e-3);
        gate.update(1.5, &mut events);
        assert_eq!(gate.angle(), 0.0);
    }

    #[test]
    fn test_reopen_while_opening_is_noop() {
        let mut gate = quick_gate();
        let mut events = Vec::new();
        gate.unlock(0.0, &mut events);
        events.clear();
        assert!(!gate.open(0.2, &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn test_toggle_locked_is_refused() {
        let mut gate = quick_gate();
        let mut events = Vec::new();
        assert!(!gate.toggle(0.0, &mut events));
        assert_eq!(events, vec![GateEvent::Refused]);
        assert_eq!(gate.door_state(), DoorState::Closed);
    }

    #[test]
    fn test_toggle_flips_settled_door() {
        let mut gate = Gate::new(GateConfig {
            start_unlocked: true,
            open_angle: 90.0,
            animation_secs: 1.0,
        });
        let mut events = Vec::new();
        assert!(gate.toggle(0.0, &mut events));
        // Ignored mid-swing
        assert!(!gate.toggle(0.5, &mut events));
        gate.update(1.0, &mut events);
        assert_eq!(gate.door_state(), DoorState::Open);
        assert!(gate.toggle(1.0, &mut events));
        gate.update(2.0, &mut events);
        assert_eq!(gate.door_state(), DoorState::Closed);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut gate = Gate::new(GateConfig {
            start_unlocked: false,
            open_angle: 80.0,
            animation_secs: 0.0,
        });
        let mut events = Vec::new();
        gate.unlock(0.0, &mut events);
        gate.update(0.0, &mut events);
        assert_eq!(gate.angle(), 80.0);
        assert_eq!(gate.door_state(), DoorState::Open);
    }
}
