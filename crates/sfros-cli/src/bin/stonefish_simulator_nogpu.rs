//! `stonefish_simulator_nogpu` – headless simulator node.
//!
//! ```text
//! stonefish_simulator_nogpu <DATA_PATH> <SCENARIO> <RATE> [--config <FILE>]
//! ```

use std::process::ExitCode;

use clap::Parser;
use sfros_app::{ConsoleSimulationApp, NodeOptions, init_tracing};
use sfros_cli::args::{self, ConsoleArgs};
use sfros_cli::{config, runner};
use sfros_engine::Scenario;
use sfros_engine::sim::SimManager;
use sfros_middleware::ShutdownSignal;
use sfros_types::SimError;
use tracing::info;

const NODE_NAME: &str = "stonefish_simulator_nogpu";

fn main() -> ExitCode {
    let args = ConsoleArgs::parse();
    let _telemetry = init_tracing(NODE_NAME);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            runner::report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: ConsoleArgs) -> Result<(), SimError> {
    let cfg = config::load(args.config.as_deref())?;
    let rate = args::validate_rate(args.rate)?;
    let bridge = cfg.bridge_addr()?;
    let scenario = Scenario::load(&args.scenario)?;
    let node_name = cfg.node_name_or(NODE_NAME);

    runner::print_banner(&node_name, "headless");
    info!(scenario = %args.scenario.display(), rate, "loading scenario");

    let shutdown = ShutdownSignal::new();
    runner::install_ctrlc(&shutdown);

    let mut sim = SimManager::from_scenario(&scenario)
        .with_step_rate(rate)
        .with_frame_period(cfg.tick_period());
    let data_dir = args::data_dir(&args.data_path);
    let app = ConsoleSimulationApp::new(runner::APP_TITLE, data_dir, &mut sim);
    let options = NodeOptions::console(node_name).with_tick_period(cfg.tick_period());
    runner::serve(options, app, shutdown, bridge)?;

    info!(steps = sim.steps(), "simulation done");
    Ok(())
}
