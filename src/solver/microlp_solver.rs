// microlp adapter: pure Rust branch-and-bound through good_lp, always compiled

use super::{constant_infeasibility, good_lp_model};
use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    solver_service::{violated_constant_constraint, Result, SolverService},
};
use good_lp::{solvers::microlp::microlp, SolverModel};
use std::time::Instant;

pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for MicroLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        if let Some(row) = violated_constant_constraint(problem) {
            return Ok(constant_infeasibility(problem, &row.name));
        }

        let start_time = Instant::now();
        let translated = good_lp_model::translate(problem);

        let mut lp_model = good_lp_model::apply_limits(
            translated.vars.minimise(translated.objective).using(microlp),
            &problem.solver_config,
        )?;
        for constraint in translated.constraints {
            lp_model = lp_model.with(constraint);
        }

        let outcome = lp_model.solve();
        good_lp_model::interpret(problem, &translated.columns, outcome, start_time.elapsed())
    }

    fn name(&self) -> &str {
        "microlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use good_lp::solvers::WithMipGap;
    use crate::domain::{
        models::{Constraint, ObjectiveFunction, SolverConfig, Variable},
        value_objects::{ConstraintType, OptimizationType, SolutionStatus},
    };

    // Pick at least two of three items at minimum cost
    fn pick_two(bound: f64) -> OptimizationProblem {
        let mut problem = OptimizationProblem::new(
            ObjectiveFunction::new(OptimizationType::Minimize)
                .with_terms(vec![(0, 3.0), (1, 1.0), (2, 2.0)]),
        )
        .with_name("pick_two");
        for name in ["a", "b", "c"] {
            problem.add_variable(Variable::binary(name));
        }
        problem.add_constraint(Constraint::new(
            ConstraintType::GreaterThanOrEqual,
            vec![(0, 1.0), (1, 1.0), (2, 1.0)],
            bound,
        ));
        problem
    }

    #[test]
    fn test_solves_binary_problem() {
        let solution = MicroLpSolver::new().solve(&pick_two(2.0)).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 3.0).abs() < 1e-6);
        let picked: Vec<bool> = solution.variable_values.iter().map(|v| *v > 0.5).collect();
        assert_eq!(picked, vec![false, true, true]);
    }

    #[test]
    fn test_reports_infeasible() {
        let solution = MicroLpSolver::new().solve(&pick_two(4.0)).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.variable_values.is_empty());
    }

    #[test]
    fn test_constant_row_is_infeasible_without_solving() {
        let mut problem = pick_two(1.0);
        problem.add_constraint(
            Constraint::new(ConstraintType::GreaterThanOrEqual, vec![], 1.0).with_name("empty"),
        );
        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.message.contains("'empty'"));
    }

    #[test]
    fn test_generous_limits_still_prove_optimality() {
        let problem = pick_two(2.0).with_config(
            SolverConfig::default()
                .with_time_limit(60.0)
                .with_gap_tolerance(0.0),
        );
        let solution = MicroLpSolver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.gap, Some(0.0));
        assert!((solution.objective_value.unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_gap_tolerance_reaches_the_engine() {
        let config = SolverConfig::default().with_gap_tolerance(0.05);
        let translated = good_lp_model::translate(&pick_two(2.0));
        let model = good_lp_model::apply_limits(
            translated.vars.minimise(translated.objective).using(microlp),
            &config,
        )
        .unwrap();

        assert_eq!(model.mip_gap(), Some(0.05));
    }

    #[test]
    fn test_maximize_is_negated() {
        let mut problem = pick_two(0.0);
        problem.objective.optimization_type = OptimizationType::Maximize;
        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert!((solution.objective_value.unwrap() - 6.0).abs() < 1e-6);
    }
}
