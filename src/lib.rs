// Domain layer: workforce input, model construction, decoding, solver contract
pub mod domain;

// Application layer: Use cases and service orchestration
pub mod application;

// Infrastructure layer: External concerns (gRPC, server, logging)
#[cfg(feature = "server")]
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    build, decode, ConfigurationError, Day, DecodeError, Demand, Employee, Horizon, InputError,
    PolicyParameters, PolicyRule, ScheduleEntry, ScheduleModel, ShiftInterval, Solution,
    SolutionStatus, SolvedAssignment, SolverBackend, SolverConfig, SolverError, SolverService,
    WorkforceInstance,
};

pub use application::{ScheduleOutcome, SchedulingError, SchedulingService, SolveResult};

#[cfg(feature = "server")]
pub use application::GrpcSchedulingService;

#[cfg(feature = "server")]
pub use infrastructure::{start_server, ServerConfig};

pub use solver::{MicroLpSolver, SolverFactory};

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;

#[cfg(feature = "highs")]
pub use solver::HighsSolver;
