use thiserror::Error;

use tm_core::TmError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("kernel error: {0}")]
    Kernel(#[from] TmError),
}

pub type SimResult<T> = Result<T, SimError>;
