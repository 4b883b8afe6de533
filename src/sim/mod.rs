//! Deterministic simulation module
//!
//! The beam/target/gate engine lives here. It must stay pure and deterministic:
//! - Fixed timestep only, time read from a supplied clock
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod absorber;
pub mod beam;
pub mod clock;
pub mod completion;
pub mod events;
pub mod gate;
pub mod geometry;
pub mod registry;
pub mod scene;
pub mod session;
pub mod target;
pub mod tick;

pub use absorber::Absorber;
pub use beam::{Beam, BeamEnd, Emitter, TargetLookup, trace_beam};
pub use clock::{FixedStepper, ManualClock, SimClock, SimTime};
pub use completion::{
    CollectableTracker, CompletionEvaluator, CompletionTransition, FixedCollectables, LevelRequirement,
    evaluate,
};
pub use events::{EngineEvent, EventBus, SubscriptionId};
pub use gate::{DoorPosition, DoorState, Gate, GateConfig, GateEvent, LockState};
pub use geometry::reflect;
pub use registry::TargetRegistry;
pub use scene::{EntityId, EntityKind, RayHit, SceneObject, SceneQuery, Shape, StaticScene};
pub use session::{EngineContext, LevelSession};
pub use target::{HitOutcome, Target, TargetTransition};
pub use tick::{TickInput, tick};
