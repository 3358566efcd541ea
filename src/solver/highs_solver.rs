// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS
// This is an adapter pattern - translates our domain models to HiGHS API

use super::constant_infeasibility;
use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolutionQuality, SolverStatistics},
    solver_service::{
        violated_constant_constraint, Result, SolverError, SolverService, FEASIBILITY_TOLERANCE,
    },
    value_objects::{ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus},
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;
use tracing::warn;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        if let Some(row) = violated_constant_constraint(problem) {
            return Ok(constant_infeasibility(problem, &row.name));
        }

        let start_time = Instant::now();
        let num_vars = problem.num_variables();

        let mut objective = vec![0.0; num_vars];
        for &(i, coeff) in &problem.objective.terms {
            objective[i] += coeff;
        }

        // Use HiGHS RowProblem (add variables first, then constraints)
        let mut pb = RowProblem::default();
        let cols: Vec<_> = objective
            .iter()
            .map(|&obj_coeff| pb.add_integer_column(obj_coeff, 0.0..=1.0))
            .collect();

        for constraint in problem.constraints.iter().filter(|c| !c.terms.is_empty()) {
            let terms: Vec<_> = constraint
                .terms
                .iter()
                .map(|&(i, coeff)| (cols[i], coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, &terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., &terms);
                }
            }
        }

        let sense = if problem.objective.optimization_type == OptimizationType::Maximize {
            Sense::Maximise
        } else {
            Sense::Minimise
        };

        let config = &problem.solver_config;
        let mut model = pb.optimise(sense);
        model.set_option("output_flag", config.verbose);
        if let Some(seconds) = config.time_limit {
            model.set_option("time_limit", seconds);
        }
        if let Some(gap) = config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        let solved = model.solve();
        let statistics =
            SolverStatistics::for_problem(problem, start_time.elapsed().as_secs_f64() * 1000.0);
        let gap = achieved_gap(solved.mip_gap());

        match solved.status() {
            HighsModelStatus::Optimal => {
                let variable_values = solved.get_solution().columns().to_vec();
                let objective_value = problem.objective.evaluate(&variable_values);
                let violation = problem.max_constraint_violation(&variable_values);

                Ok(DomainSolution::optimal(objective_value, variable_values)
                    .with_gap(gap.or(Some(0.0)))
                    .with_message(format!("Optimal solution found for '{}'", problem.name))
                    .with_statistics(statistics)
                    .with_quality(SolutionQuality {
                        max_constraint_violation: violation,
                    }))
            }
            HighsModelStatus::ReachedTimeLimit => {
                // HiGHS stops with or without an incumbent; only keep one that holds
                let variable_values = solved.get_solution().columns().to_vec();
                let violation = if variable_values.len() == num_vars {
                    problem.max_constraint_violation(&variable_values)
                } else {
                    f64::INFINITY
                };

                if violation <= FEASIBILITY_TOLERANCE {
                    let objective_value = problem.objective.evaluate(&variable_values);
                    Ok(DomainSolution::feasible(objective_value, gap, variable_values)
                        .with_statistics(statistics)
                        .with_quality(SolutionQuality {
                            max_constraint_violation: violation,
                        }))
                } else {
                    warn!(violation, "HiGHS hit the time limit without a feasible incumbent");
                    Ok(DomainSolution::new(
                        DomainSolutionStatus::Error,
                        "Time limit reached without a feasible solution",
                    )
                    .with_statistics(statistics))
                }
            }
            HighsModelStatus::Infeasible => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}

/// Relative gap HiGHS reached; infinite when no incumbent bounds it
fn achieved_gap(gap: f64) -> Option<f64> {
    gap.is_finite().then_some(gap)
}
