//! Fatal error types raised by the per-cycle pipeline.

use thiserror::Error;

/// Fatal conditions that abort the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("element {elem} volume {volume} is nonpositive at cycle {cycle}")]
    VolumeError { elem: usize, volume: f64, cycle: usize },

    #[error("element {elem} artificial viscosity {q} exceeds qstop {qstop} at cycle {cycle}")]
    QStopError { elem: usize, q: f64, qstop: f64, cycle: usize },

    #[error("rank count {0} is not a perfect cube")]
    NonCubeRankCount(u32),

    #[error("subdomain edge element count must be at least 1, got {0}")]
    ZeroSizedSubdomain(usize),
}

impl From<sedov_model::DomainError> for SolverError {
    fn from(err: sedov_model::DomainError) -> Self {
        match err {
            sedov_model::DomainError::NonCubeRankCount(n) => SolverError::NonCubeRankCount(n),
            sedov_model::DomainError::ZeroSizedSubdomain(n) => SolverError::ZeroSizedSubdomain(n),
        }
    }
}

impl SolverError {
    /// Process exit code for this error, distinct from the CLI's own usage-error code.
    pub fn exit_code(&self) -> u8 {
        match self {
            SolverError::VolumeError { .. } | SolverError::QStopError { .. } => 3,
            SolverError::NonCubeRankCount(_) | SolverError::ZeroSizedSubdomain(_) => 4,
        }
    }
}
