use thiserror::Error;

use super::button::{ButtonAction, ButtonName};

pub type ToolbarResult<T> = std::result::Result<T, ToolbarError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolbarError {
    #[error("unknown toolbar button: {0}")]
    UnknownButton(String),
    #[error("button {button} has no {action:?} action")]
    UnsupportedAction {
        button: ButtonName,
        action: ButtonAction,
    },
}
