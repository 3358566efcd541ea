// Application layer: use cases and, with the `server` feature, the gRPC adapter

#[cfg(feature = "server")]
pub mod grpc_service;
#[cfg(feature = "server")]
pub mod mappers;
pub mod scheduling_service;

#[cfg(feature = "server")]
pub use grpc_service::GrpcSchedulingService;
pub use scheduling_service::{ScheduleOutcome, SchedulingError, SchedulingService, SolveResult};
