use crate::domain::{
    solver_service::{SolverError, SolverService},
    value_objects::SolverBackend,
};
use crate::solver::MicroLpSolver;
#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    ///
    /// Engines not compiled into this build are reported as unavailable.
    pub fn create_from_backend(
        backend: SolverBackend,
    ) -> Result<Arc<dyn SolverService>, SolverError> {
        match backend {
            SolverBackend::Auto => Ok(Self::default_solver()),
            SolverBackend::MicroLp => Ok(Arc::new(MicroLpSolver::new())),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(CoinCbcSolver::new())),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(HighsSolver::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::SolverNotAvailable(format!(
                "{} is not compiled into this build",
                other
            ))),
        }
    }

    /// Get the default solver: HiGHS, then CBC, then microlp
    pub fn default_solver() -> Arc<dyn SolverService> {
        #[cfg(feature = "highs")]
        return Arc::new(HighsSolver::new());

        #[cfg(all(feature = "coin_cbc", not(feature = "highs")))]
        return Arc::new(CoinCbcSolver::new());

        #[cfg(not(any(feature = "coin_cbc", feature = "highs")))]
        return Arc::new(MicroLpSolver::new());
    }

    /// Backends that can be created in this build
    pub fn available_backends() -> Vec<SolverBackend> {
        [
            SolverBackend::MicroLp,
            SolverBackend::CoinCbc,
            SolverBackend::Highs,
        ]
        .into_iter()
        .filter(|backend| Self::create_from_backend(*backend).is_ok())
        .collect()
    }
}
