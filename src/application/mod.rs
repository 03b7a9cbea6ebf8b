//! Application layer: the session engine driving a bilan.

pub mod session_engine;

pub use session_engine::{Collaborators, EngineEvent, SessionEngine, StepOutcome};
