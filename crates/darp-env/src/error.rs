use darp_entity::EntityError;
use darp_instance::InstanceError;
use thiserror::Error;

/// Fatal environment errors.
///
/// Bad actions are not errors: they come back as negative
/// [`ActionOutcome`](crate::ActionOutcome)s and the episode continues.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("environment configuration error: {0}")]
    Config(String),

    #[error("step called before reset")]
    NotReset,

    #[error("internal consistency violated: {0}")]
    InvariantViolated(String),

    #[error("entity state machine rejected a scheduled service: {0}")]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Instance(#[from] InstanceError),
}

pub type EnvResult<T> = Result<T, EnvError>;
