//! Dispatch error types.

use thiserror::Error;

use crate::state::DispatcherState;

/// Errors that can occur while tracking dispatcher state or admitting work.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid dispatcher transition: {from} -> {to}")]
    InvalidTransition {
        from: DispatcherState,
        to: DispatcherState,
    },

    #[error("dispatcher state channel closed")]
    StateChannelClosed,

    #[error("configuration error: {0}")]
    Config(#[from] fnhost_core::ConfigError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
