// COIN-OR CBC adapter through good_lp
// Time limit and relative gap go through good_lp's limit traits

use super::{constant_infeasibility, good_lp_model};
use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    solver_service::{violated_constant_constraint, Result, SolverService},
};
use good_lp::{solvers::coin_cbc::coin_cbc, SolverModel};
use std::time::Instant;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        if let Some(row) = violated_constant_constraint(problem) {
            return Ok(constant_infeasibility(problem, &row.name));
        }

        let start_time = Instant::now();
        let translated = good_lp_model::translate(problem);

        let config = &problem.solver_config;
        let mut lp_model = good_lp_model::apply_limits(
            translated.vars.minimise(translated.objective).using(coin_cbc),
            config,
        )?;
        if !config.verbose {
            lp_model.set_parameter("log", "0");
        }

        for constraint in translated.constraints {
            lp_model = lp_model.with(constraint);
        }

        let outcome = lp_model.solve();
        good_lp_model::interpret(problem, &translated.columns, outcome, start_time.elapsed())
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }
}
