//! Thin wiring binary: owns the driver callback channel, runs the `Supervisor` serial executor,
//! and is the sole place the process ever calls `std::process::exit` (§6, §9).

mod wiring;

use std::sync::Arc;

use helmsman_kernel::clock::SystemClock;
use helmsman_kernel::config::{load_engine_config, EngineConfig};
use helmsman_kernel::exit::fatal_error_channel;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())).init();

    let rt = tokio::runtime::Runtime::new()?;
    let exit_code = rt.block_on(run());
    std::process::exit(exit_code);
}

async fn run() -> i32 {
    let config = std::env::var("HELMSMAN_CONFIG")
        .ok()
        .and_then(|path| load_engine_config(&path).ok())
        .unwrap_or_else(EngineConfig::default);

    let state_store = helmsman_engine::InMemoryStateStore::new();
    let config_store = helmsman_engine::InMemoryConfigStore::new();
    let driver: Arc<dyn helmsman_kernel::driver::SchedulerDriver> = Arc::new(helmsman_engine::RecordingDriver::new());

    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let callbacks = wiring::DriverCallbacks::new(event_tx);
    let (fatal_tx, mut fatal_rx) = fatal_error_channel();

    let supervisor = match wiring::Supervisor::new(driver.clone(), Arc::new(state_store), Arc::new(config_store), config, Arc::new(SystemClock)) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize supervisor");
            return helmsman_kernel::exit::ExitCode::InitializationFailure.code();
        }
    };

    // A real integration would hand `callbacks` to the cluster-manager's driver bindings, whose
    // own callback thread invokes these methods directly. Here we just keep it alive so the
    // channel stays open until the driver would naturally call `registered` on connect.
    let _callbacks = callbacks;

    tokio::spawn(supervisor.run(event_rx, fatal_tx));

    match fatal_rx.recv().await {
        Some(fatal) => {
            tracing::error!(error = ?fatal, "fatal error, exiting");
            fatal.exit_code().code()
        }
        None => helmsman_kernel::exit::ExitCode::Normal.code(),
    }
}
