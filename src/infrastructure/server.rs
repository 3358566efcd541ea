// Infrastructure: Server setup and configuration

use std::net::SocketAddr;
use tonic::transport::Server;
use tracing::info;

use crate::application::mappers::workforce_scheduler::workforce_scheduler_server as proto_server;
use crate::application::GrpcSchedulingService;
use crate::domain::value_objects::SolverBackend;
use crate::solver::SolverFactory;

pub const ADDRESS_VAR: &str = "WORKFORCE_SCHEDULER_ADDR";
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:50051";

#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("{var} is not a valid socket address: '{value}'")]
    InvalidAddress { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Engine used when a request asks for `AUTO`
    pub default_backend: SolverBackend,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, default_backend: SolverBackend) -> Self {
        Self {
            address,
            default_backend,
        }
    }

    /// Read the listen address from `WORKFORCE_SCHEDULER_ADDR`
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_address(std::env::var(ADDRESS_VAR).ok().as_deref())
    }

    fn from_address(value: Option<&str>) -> Result<Self, ServerConfigError> {
        let value = value.unwrap_or(DEFAULT_ADDRESS);
        let address = value
            .parse()
            .map_err(|_| ServerConfigError::InvalidAddress {
                var: ADDRESS_VAR,
                value: value.to_string(),
            })?;
        Ok(Self::new(address, SolverBackend::Auto))
    }
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = GrpcSchedulingService::new(config.default_backend);

    let engines: Vec<String> = SolverFactory::available_backends()
        .iter()
        .map(ToString::to_string)
        .collect();
    info!(
        address = %config.address,
        default_backend = %config.default_backend,
        auto_engine = SolverFactory::default_solver().name(),
        engines = ?engines,
        "Workforce scheduler listening"
    );

    Server::builder()
        .add_service(proto_server::WorkforceSchedulerServer::new(service))
        .serve(config.address)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        let config = ServerConfig::from_address(None).unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS.parse().unwrap());
        assert_eq!(config.default_backend, SolverBackend::Auto);
    }

    #[test]
    fn test_custom_address() {
        let config = ServerConfig::from_address(Some("127.0.0.1:6000")).unwrap();
        assert_eq!(config.address.port(), 6000);
    }

    #[test]
    fn test_bad_address_is_rejected() {
        assert!(matches!(
            ServerConfig::from_address(Some("localhost")),
            Err(ServerConfigError::InvalidAddress { .. })
        ));
    }
}
