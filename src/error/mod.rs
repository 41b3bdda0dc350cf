use crate::config::ConfigError;
use crate::draw::DrawError;
use crate::state::StateError;
use crate::toolbar::ToolbarError;
use thiserror::Error;

pub type PmResult<T> = std::result::Result<T, PmError>;

#[derive(Debug, Error)]
pub enum PmError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Toolbar(#[from] ToolbarError),
    #[error(transparent)]
    Draw(#[from] DrawError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
