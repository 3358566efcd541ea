// Solver adapters module

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_solver;
pub mod factory;
mod good_lp_model;
#[cfg(feature = "highs")]
pub mod highs_solver;
pub mod microlp_solver;

#[cfg(feature = "coin_cbc")]
pub use coin_cbc_solver::CoinCbcSolver;
pub use factory::SolverFactory;
#[cfg(feature = "highs")]
pub use highs_solver::HighsSolver;
pub use microlp_solver::MicroLpSolver;

use crate::domain::models::{OptimizationProblem, Solution, SolverStatistics};
use crate::domain::value_objects::SolutionStatus;

/// Solution reported when a constant row already rules out every assignment
pub(crate) fn constant_infeasibility(problem: &OptimizationProblem, row: &str) -> Solution {
    Solution::new(
        SolutionStatus::Infeasible,
        format!("Constraint '{}' cannot be satisfied by any assignment", row),
    )
    .with_statistics(SolverStatistics::for_problem(problem, 0.0))
}
