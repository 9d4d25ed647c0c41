//! Chat sessions: per-session transcript and the controller that appends to it.
//!
//! - `SessionController`: runs one turn through the orchestrator and
//!   appends the user/assistant pair atomically
//! - `SessionRegistry`: owns every live session, keyed by id

mod controller;
mod registry;
mod transcript;

pub use controller::{SessionController, TurnOutcome};
pub use registry::{SessionHandle, SessionRegistry};
pub use transcript::{ChatTurn, Speaker, Transcript};
