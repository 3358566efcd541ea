// Domain service interface for solving optimization problems
// Any engine adapter implements this contract; the scheduler only sees the trait

use super::models::{Constraint, OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Tolerance used when checking constraints against solver output
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Domain service interface for optimization solvers
///
/// Implementations translate an [`OptimizationProblem`] into their engine,
/// honor the time limit and gap tolerance of `problem.solver_config`, and
/// map the engine status onto [`SolutionStatus`](super::SolutionStatus).
/// Infeasibility is a solution status, not an error.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<()> {
        let mut errors = Vec::new();

        if problem.variables.is_empty() {
            errors.push("Problem must have at least one variable".to_string());
        }

        let num_vars = problem.num_variables();

        for &(var, _) in &problem.objective.terms {
            if var >= num_vars {
                errors.push(format!("Objective references unknown variable {}", var));
            }
        }

        for (i, constraint) in problem.constraints.iter().enumerate() {
            if let Some(&(var, _)) = constraint.terms.iter().find(|(var, _)| *var >= num_vars) {
                errors.push(format!(
                    "Constraint {} '{}' references unknown variable {}",
                    i, constraint.name, var
                ));
            }
            if !constraint.bound.is_finite()
                || constraint.terms.iter().any(|(_, coeff)| !coeff.is_finite())
            {
                errors.push(format!(
                    "Constraint {} '{}' has a non-finite coefficient or bound",
                    i, constraint.name
                ));
            }
        }

        if let Err(e) = problem.solver_config.validate() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;
}

/// First constraint without variables whose constant comparison fails.
///
/// Such a row makes the problem infeasible before any engine runs; adapters
/// report it directly instead of handing engines an empty row.
pub fn violated_constant_constraint(problem: &OptimizationProblem) -> Option<&Constraint> {
    problem
        .constraints
        .iter()
        .filter(|c| c.terms.is_empty())
        .find(|c| !c.is_satisfied_by(&[], FEASIBILITY_TOLERANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ObjectiveFunction, SolverConfig, Variable};
    use crate::domain::value_objects::{ConstraintType, OptimizationType};

    struct NullSolver;

    impl SolverService for NullSolver {
        fn solve(&self, _problem: &OptimizationProblem) -> Result<Solution> {
            Err(SolverError::SolverNotAvailable("null".into()))
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    fn problem() -> OptimizationProblem {
        let mut problem = OptimizationProblem::new(
            ObjectiveFunction::new(OptimizationType::Minimize).with_terms(vec![(0, 1.0)]),
        );
        problem.add_variable(Variable::binary("a"));
        problem
    }

    #[test]
    fn test_validate_accepts_well_formed_problem() {
        let mut problem = problem();
        problem.add_constraint(Constraint::new(
            ConstraintType::GreaterThanOrEqual,
            vec![(0, 1.0)],
            1.0,
        ));
        assert!(NullSolver.validate(&problem).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_variable() {
        let mut problem = problem();
        problem.add_constraint(
            Constraint::new(ConstraintType::LessThanOrEqual, vec![(3, 1.0)], 1.0).with_name("bad"),
        );
        let err = NullSolver.validate(&problem).unwrap_err();
        assert!(err.to_string().contains("'bad' references unknown variable 3"));
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let problem = problem().with_config(SolverConfig::default().with_time_limit(-1.0));
        assert!(matches!(
            NullSolver.validate(&problem),
            Err(SolverError::InvalidProblem(_))
        ));
    }

    #[test]
    fn test_violated_constant_constraint() {
        let mut problem = problem();
        problem.add_constraint(Constraint::new(ConstraintType::LessThanOrEqual, vec![], 1.0));
        assert!(violated_constant_constraint(&problem).is_none());

        problem.add_constraint(
            Constraint::new(ConstraintType::GreaterThanOrEqual, vec![], 2.0).with_name("nobody"),
        );
        assert_eq!(violated_constant_constraint(&problem).unwrap().name, "nobody");
    }
}
