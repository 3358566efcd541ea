use shiftopt::infrastructure::logging;
use shiftopt::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    // Address from WORKFORCE_SCHEDULER_ADDR, default 0.0.0.0:50051
    let config = ServerConfig::from_env()?;
    start_server(config).await?;

    Ok(())
}
