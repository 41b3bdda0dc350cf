pub(crate) mod behavior;
pub mod error;
pub mod machine;

pub use error::{StateError, StateResult};
pub use machine::{DragGranularity, GlobalMode, ModeFlags, ModeTransition, StateMachine};
