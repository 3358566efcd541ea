// Use case: build the workforce model, solve it, decode the schedule
// The solver is injected, so the pipeline runs against any SolverService

use crate::domain::{
    model_builder::{self, ScheduleModel},
    models::{SolverConfig, SolverStatistics},
    policy::ConfigurationError,
    schedule_decoder::{self, DecodeError, ScheduleEntry, SolvedAssignment},
    solver_service::{SolverError, SolverService},
    value_objects::{SolutionStatus, SolverBackend},
    workforce::{InputError, WorkforceInstance},
};
use crate::solver::SolverFactory;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Gap below which a solution is reported as proven optimal
const OPTIMALITY_GAP: f64 = 1e-4;

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("{solver} failed with status {status}: {message}")]
    SolveFailed {
        solver: String,
        status: SolutionStatus,
        message: String,
    },

    #[error("Could not decode schedule: {0}")]
    Decode(#[from] DecodeError),
}

/// Outcome of one solve
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub status: SolutionStatus,
    pub objective_value: Option<f64>,
    pub gap: Option<f64>,
    pub message: String,
    pub solver: String,
    pub statistics: SolverStatistics,
    /// Present for optimal and feasible solves only
    pub assignment: Option<SolvedAssignment>,
}

/// Result of the full pipeline
#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    Scheduled {
        result: SolveResult,
        entries: Vec<ScheduleEntry>,
    },
    Infeasible {
        result: SolveResult,
    },
}

impl ScheduleOutcome {
    pub fn result(&self) -> &SolveResult {
        match self {
            ScheduleOutcome::Scheduled { result, .. } | ScheduleOutcome::Infeasible { result } => {
                result
            }
        }
    }

    /// Decoded entries; empty when the instance was infeasible
    pub fn entries(&self) -> &[ScheduleEntry] {
        match self {
            ScheduleOutcome::Scheduled { entries, .. } => entries,
            ScheduleOutcome::Infeasible { .. } => &[],
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, ScheduleOutcome::Infeasible { .. })
    }
}

/// Solve orchestrator for workforce scheduling
pub struct SchedulingService {
    solver: Arc<dyn SolverService>,
}

impl SchedulingService {
    pub fn new(solver: Arc<dyn SolverService>) -> Self {
        Self { solver }
    }

    pub fn with_backend(backend: SolverBackend) -> Result<Self, SchedulingError> {
        Ok(Self::new(SolverFactory::create_from_backend(backend)?))
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Solve a built model under `config`'s time limit and gap tolerance
    pub fn solve(
        &self,
        model: &ScheduleModel,
        config: &SolverConfig,
    ) -> Result<SolveResult, SchedulingError> {
        config.validate()?;

        let problem = if model.problem.solver_config == *config {
            Cow::Borrowed(&model.problem)
        } else {
            Cow::Owned(model.problem.clone().with_config(config.clone()))
        };

        info!(
            solver = self.solver.name(),
            time_limit = ?config.time_limit,
            mip_gap = ?config.gap_tolerance,
            "Optimization process started"
        );
        let solution = self.solver.solve(&problem)?;

        match solution.status {
            SolutionStatus::Optimal => {
                if solution.gap.unwrap_or(0.0) < OPTIMALITY_GAP {
                    info!(objective = ?solution.objective_value, "Optimal solution found");
                } else {
                    info!(
                        objective = ?solution.objective_value,
                        gap = ?solution.gap,
                        "Found a solution with gap within the configured MIP gap"
                    );
                }
            }
            SolutionStatus::Feasible => {
                info!(
                    objective = ?solution.objective_value,
                    gap = ?solution.gap,
                    "Feasible solution found within time limit"
                );
            }
            SolutionStatus::Infeasible => {
                warn!("Problem instance not feasible");
            }
            SolutionStatus::Error => {
                error!(message = %solution.message, "Solver reported an error");
                return Err(SchedulingError::SolveFailed {
                    solver: self.solver.name().to_string(),
                    status: solution.status,
                    message: solution.message,
                });
            }
        }

        let assignment = if solution.status.has_assignment() {
            Some(SolvedAssignment::from_solution(model, &solution)?)
        } else {
            None
        };

        Ok(SolveResult {
            status: solution.status,
            objective_value: solution.objective_value,
            gap: solution.gap,
            message: solution.message,
            solver: self.solver.name().to_string(),
            statistics: solution.statistics,
            assignment,
        })
    }

    /// Build, solve and decode the schedule for `instance`
    pub fn schedule(
        &self,
        instance: &WorkforceInstance,
        config: &SolverConfig,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        let model = model_builder::build(instance)?;
        let result = self.solve(&model, config)?;

        match &result.assignment {
            Some(assignment) => {
                let entries = schedule_decoder::decode(assignment, instance)?;
                info!(entries = entries.len(), "Schedule decoded");
                Ok(ScheduleOutcome::Scheduled { result, entries })
            }
            None => Ok(ScheduleOutcome::Infeasible { result }),
        }
    }
}

impl Default for SchedulingService {
    fn default() -> Self {
        Self::new(SolverFactory::default_solver())
    }
}
