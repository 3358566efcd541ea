use std::pin::Pin;

use tokio_stream::Stream;
use tonic::{Request, Response, Status};
use tracing::info;

use super::mappers::{self, workforce_scheduler as proto};
use super::scheduling_service::{ScheduleOutcome, SchedulingService};
use crate::domain::value_objects::SolverBackend;
use crate::solver::SolverFactory;

type EntryStream = Pin<Box<dyn Stream<Item = Result<proto::ScheduleEntry, Status>> + Send>>;

/// gRPC service implementation
pub struct GrpcSchedulingService {
    default_backend: SolverBackend,
}

impl GrpcSchedulingService {
    pub fn new(default_backend: SolverBackend) -> Self {
        Self { default_backend }
    }

    /// Convert, solve on the blocking pool, and hand back the outcome
    async fn run(&self, request: proto::ScheduleRequest) -> Result<ScheduleOutcome, Status> {
        let (instance, mut config) = mappers::proto_to_domain_request(request).map_err(|e| *e)?;
        if config.backend == SolverBackend::Auto {
            config.backend = self.default_backend;
        }

        let service = SchedulingService::with_backend(config.backend)
            .map_err(mappers::scheduling_error_to_status)?;

        info!(
            employees = instance.nr_employees(),
            days = instance.nr_days(),
            slots = instance.nr_slots(),
            solver = service.solver_name(),
            "Scheduling request received"
        );

        tokio::task::spawn_blocking(move || service.schedule(&instance, &config))
            .await
            .map_err(|e| Status::internal(format!("Solve task failed: {}", e)))?
            .map_err(mappers::scheduling_error_to_status)
    }
}

impl Default for GrpcSchedulingService {
    fn default() -> Self {
        Self::new(SolverBackend::Auto)
    }
}

// Every compiled engine honours both limits
fn solver_info(backend: SolverBackend) -> proto::SolverInfo {
    proto::SolverInfo {
        name: backend.to_string(),
        backend: mappers::domain_to_proto_backend(backend) as i32,
        supports_time_limit: true,
        supports_mip_gap: true,
    }
}

#[tonic::async_trait]
impl proto::workforce_scheduler_server::WorkforceScheduler for GrpcSchedulingService {
    async fn schedule(
        &self,
        request: Request<proto::ScheduleRequest>,
    ) -> Result<Response<proto::ScheduleResponse>, Status> {
        let outcome = self.run(request.into_inner()).await?;
        info!(status = %outcome.result().status, "Scheduling request finished");
        Ok(Response::new(mappers::domain_to_proto_response(&outcome)))
    }

    type ScheduleStreamStream = EntryStream;

    async fn schedule_stream(
        &self,
        request: Request<proto::ScheduleRequest>,
    ) -> Result<Response<Self::ScheduleStreamStream>, Status> {
        let outcome = self.run(request.into_inner()).await?;
        if outcome.is_infeasible() {
            return Err(Status::failed_precondition(format!(
                "No feasible schedule: {}",
                outcome.result().message
            )));
        }

        let entries: Vec<Result<proto::ScheduleEntry, Status>> = outcome
            .entries()
            .iter()
            .map(|entry| Ok(mappers::domain_to_proto_entry(entry)))
            .collect();

        Ok(Response::new(Box::pin(tokio_stream::iter(entries))))
    }

    async fn get_available_solvers(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::AvailableSolvers>, Status> {
        let solvers = SolverFactory::available_backends()
            .into_iter()
            .map(solver_info)
            .collect();

        Ok(Response::new(proto::AvailableSolvers { solvers }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::workforce_scheduler_server::WorkforceScheduler;

    #[tokio::test]
    async fn test_available_solvers_include_microlp() {
        let service = GrpcSchedulingService::default();
        let response = service
            .get_available_solvers(Request::new(proto::Empty {}))
            .await
            .unwrap()
            .into_inner();

        let microlp = response
            .solvers
            .iter()
            .find(|s| s.backend == proto::SolverBackend::Microlp as i32)
            .unwrap();
        assert_eq!(microlp.name, "microlp");
        assert!(microlp.supports_time_limit);
        assert!(microlp.supports_mip_gap);
    }

    #[tokio::test]
    async fn test_empty_request_is_invalid_argument() {
        let service = GrpcSchedulingService::new(SolverBackend::MicroLp);
        let status = service
            .schedule(Request::new(proto::ScheduleRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }
}
