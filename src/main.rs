/// Entry point for the Container Pulse dashboard backend.
///
/// Reads its configuration from the environment, connects to the container engine's control API
/// and serves the aggregated container views over HTTP.
///
/// # Examples
///
/// ```bash
/// ENGINE_HOST=unix:///var/run/docker.sock RUST_LOG=info cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    container_pulse::run().await
}
