// Translation of the domain problem into good_lp expressions, shared by the
// good_lp-backed adapters (microlp, COIN-OR CBC)

use crate::domain::{
    models::{
        OptimizationProblem, Solution as DomainSolution, SolutionQuality, SolverConfig,
        SolverStatistics,
    },
    solver_service::{Result, SolverError, FEASIBILITY_TOLERANCE},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus},
};
use good_lp::solvers::{SolutionStatus as GoodLpStatus, WithMipGap, WithTimeLimit};
use good_lp::{
    variable, variables, Constraint as GoodLpConstraint, Expression, ProblemVariables,
    ResolutionError, Solution as GoodLpSolutionTrait, Variable as GoodLpVariable,
};
use std::time::Duration;
use tracing::warn;

pub(crate) struct TranslatedProblem {
    pub vars: ProblemVariables,
    pub columns: Vec<GoodLpVariable>,
    /// Always a minimisation objective; maximisation is negated
    pub objective: Expression,
    pub constraints: Vec<GoodLpConstraint>,
}

pub(crate) fn translate(problem: &OptimizationProblem) -> TranslatedProblem {
    let mut vars = variables!();
    let columns: Vec<GoodLpVariable> = problem
        .variables
        .iter()
        .map(|_| vars.add(variable().integer().min(0).max(1)))
        .collect();

    // good_lp minimises, so negate for maximisation
    let is_maximize = problem.objective.optimization_type == OptimizationType::Maximize;
    let mut objective: Expression = 0.into();
    for &(i, coeff) in &problem.objective.terms {
        let c = if is_maximize { -coeff } else { coeff };
        objective += c * columns[i];
    }

    // Constant rows are checked before translation
    let constraints = problem
        .constraints
        .iter()
        .filter(|c| !c.terms.is_empty())
        .map(|constraint| {
            let mut lhs: Expression = 0.into();
            for &(i, coeff) in &constraint.terms {
                lhs += coeff * columns[i];
            }
            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => lhs.leq(constraint.bound),
                ConstraintType::Equal => lhs.eq(constraint.bound),
                ConstraintType::GreaterThanOrEqual => lhs.geq(constraint.bound),
            }
        })
        .collect();

    TranslatedProblem {
        vars,
        columns,
        objective,
        constraints,
    }
}

/// Hand the configured time limit and relative MIP gap to a good_lp model
pub(crate) fn apply_limits<M>(model: M, config: &SolverConfig) -> Result<M>
where
    M: WithTimeLimit + WithMipGap,
{
    let mut model = model;
    if let Some(seconds) = config.time_limit {
        model = model.with_time_limit(seconds);
    }
    if let Some(gap) = config.gap_tolerance {
        model = model.with_mip_gap(gap as f32).map_err(|e| {
            SolverError::InvalidProblem(format!("MIP gap {} rejected: {}", gap, e))
        })?;
    }
    Ok(model)
}

/// Domain status and gap for a solution good_lp returned.
///
/// good_lp reports a gap-limited stop without the gap it reached, so the
/// configured tolerance is reported as its upper bound.
pub(crate) fn classify(
    status: GoodLpStatus,
    config: &SolverConfig,
) -> (SolutionStatus, Option<f64>) {
    match status {
        GoodLpStatus::Optimal => (SolutionStatus::Optimal, Some(0.0)),
        GoodLpStatus::GapLimit => (SolutionStatus::Optimal, config.gap_tolerance),
        GoodLpStatus::TimeLimit => (SolutionStatus::Feasible, None),
    }
}

/// Map a good_lp resolution onto a domain solution
pub(crate) fn interpret<S: GoodLpSolutionTrait>(
    problem: &OptimizationProblem,
    columns: &[GoodLpVariable],
    outcome: std::result::Result<S, ResolutionError>,
    elapsed: Duration,
) -> Result<DomainSolution> {
    let statistics = SolverStatistics::for_problem(problem, elapsed.as_secs_f64() * 1000.0);

    match outcome {
        Ok(sol) => {
            let variable_values: Vec<f64> = columns.iter().map(|&var| sol.value(var)).collect();
            let violation = problem.max_constraint_violation(&variable_values);
            if violation > FEASIBILITY_TOLERANCE {
                warn!(violation, "Solver returned a solution outside the feasibility tolerance");
            }
            let objective = problem.objective.evaluate(&variable_values);

            let solution = match classify(sol.status(), &problem.solver_config) {
                (SolutionStatus::Optimal, gap) => {
                    DomainSolution::optimal(objective, variable_values)
                        .with_gap(gap)
                        .with_message(format!("Optimal solution found for '{}'", problem.name))
                }
                (_, gap) => DomainSolution::feasible(objective, gap, variable_values),
            };
            Ok(solution
                .with_statistics(statistics)
                .with_quality(SolutionQuality {
                    max_constraint_violation: violation,
                }))
        }
        Err(ResolutionError::Infeasible) => Ok(DomainSolution::new(
            SolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
        .with_statistics(statistics)),
        Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
            SolutionStatus::Error,
            "Problem is unbounded: objective can be improved infinitely",
        )
        .with_statistics(statistics)),
        Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proven_optimum_has_zero_gap() {
        let config = SolverConfig::default().with_gap_tolerance(0.05);
        assert_eq!(
            classify(GoodLpStatus::Optimal, &config),
            (SolutionStatus::Optimal, Some(0.0))
        );
    }

    #[test]
    fn test_gap_limit_reports_configured_tolerance() {
        let config = SolverConfig::default().with_gap_tolerance(0.05);
        assert_eq!(
            classify(GoodLpStatus::GapLimit, &config),
            (SolutionStatus::Optimal, Some(0.05))
        );
    }

    #[test]
    fn test_time_limit_is_feasible() {
        let config = SolverConfig::default().with_time_limit(1.0);
        assert_eq!(
            classify(GoodLpStatus::TimeLimit, &config),
            (SolutionStatus::Feasible, None)
        );
    }
}
