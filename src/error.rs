use thiserror::Error;

/// Error taxonomy for the league core. Validation errors are refusals to
/// apply a mutation; integrity errors mean stored state is structurally
/// off and the affected operation was skipped; store errors cover the
/// local persistence layer.
#[derive(Error, Debug)]
pub enum LeagueError {
  #[error("validation: {0}")]
  Validation(String),

  #[error("integrity: {0}")]
  Integrity(String),

  #[error("store: {0}")]
  Store(String),
}

impl LeagueError {
  pub fn is_validation(&self) -> bool {
    matches!(self, LeagueError::Validation(_))
  }

  pub fn is_integrity(&self) -> bool {
    matches!(self, LeagueError::Integrity(_))
  }
}
