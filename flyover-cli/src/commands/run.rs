//! Run command - play a scenario headlessly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio_util::sync::CancellationToken;

use flyover::scenario::{Scenario, ScenarioHost};
use flyover::{CameraHost, FlyoverService};

use crate::error::CliError;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Scenario file (JSON)
    pub scenario: PathBuf,

    /// Seconds to run before exiting (0 = until ctrl-c)
    #[arg(long, default_value_t = 30)]
    pub duration_secs: u64,

    /// RNG seed for a reproducible tour
    #[arg(long)]
    pub seed: Option<u64>,

    /// Milliseconds between printed pose samples
    #[arg(long, default_value_t = 500)]
    pub print_interval_ms: u64,

    /// Chase this vehicle id from the start
    #[arg(long)]
    pub chase: Option<String>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let scenario = Scenario::from_path(&args.scenario)?;
    let name = scenario.name.clone();
    let options = scenario.options.clone();
    let host = Arc::new(ScenarioHost::new(scenario));

    tracing::info!(scenario = %name, "Loaded scenario");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut service = match args.seed {
            Some(seed) => {
                FlyoverService::with_seed(Arc::clone(&host) as Arc<dyn CameraHost>, options, seed)
            }
            None => FlyoverService::new(Arc::clone(&host) as Arc<dyn CameraHost>, options),
        };

        if !service.start() {
            return Err(CliError::Startup(format!(
                "scenario '{name}' has nothing to tour"
            )));
        }
        if let Some(id) = args.chase {
            service.set_chase_vehicle(Some(id));
        }

        let shutdown = CancellationToken::new();
        let handler_token = shutdown.clone();
        ctrlc::set_handler(move || handler_token.cancel())
            .map_err(|err| CliError::Startup(err.to_string()))?;

        println!("Playing '{name}' - ctrl-c to stop");

        let deadline = (args.duration_secs > 0)
            .then(|| tokio::time::Instant::now() + Duration::from_secs(args.duration_secs));
        let mut printer =
            tokio::time::interval(Duration::from_millis(args.print_interval_ms.max(50)));

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                () = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => break,

                _ = printer.tick() => {
                    let status = service.status();
                    let pose = host.view_state();
                    match &status.chase_vehicle {
                        Some(id) => println!("[{:>7}] {} chasing {}", status.mode, pose, id),
                        None => println!("[{:>7}] {} wp {}", status.mode, pose, status.waypoint_index),
                    }
                    if !status.running {
                        println!("Tour complete");
                        break;
                    }
                }
            }
        }

        service.stop().await;
        println!("Done.");
        Ok(())
    })
}
