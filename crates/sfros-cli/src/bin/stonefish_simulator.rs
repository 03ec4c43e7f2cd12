//! `stonefish_simulator` – windowed simulator node.
//!
//! ```text
//! stonefish_simulator <DATA_PATH> <SCENARIO> <RATE> <WINDOW_W> <WINDOW_H> <QUALITY> [--config <FILE>]
//! ```

use std::process::ExitCode;

use clap::Parser;
use sfros_app::{GraphicalSimulationApp, NodeOptions, init_tracing};
use sfros_cli::args::{self, GraphicalArgs};
use sfros_cli::{config, runner};
use sfros_engine::Scenario;
use sfros_engine::sim::{SimManager, SimWindow};
use sfros_middleware::ShutdownSignal;
use sfros_types::SimError;
use tracing::info;

const NODE_NAME: &str = "stonefish_simulator";

fn main() -> ExitCode {
    let args = GraphicalArgs::parse();
    let _telemetry = init_tracing(NODE_NAME);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            runner::report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: GraphicalArgs) -> Result<(), SimError> {
    let cfg = config::load(args.config.as_deref())?;
    let rate = args::validate_rate(args.rate)?;
    let bridge = cfg.bridge_addr()?;
    let scenario = Scenario::load(&args.scenario)?;
    let render = args.render_settings();
    let node_name = cfg.node_name_or(NODE_NAME);

    runner::print_banner(&node_name, &format!("{}x{}", render.window_w, render.window_h));
    info!(
        scenario = %args.scenario.display(),
        rate,
        quality = %args.quality,
        "loading scenario"
    );

    let shutdown = ShutdownSignal::new();
    runner::install_ctrlc(&shutdown);

    let mut sim = SimManager::from_scenario(&scenario)
        .with_step_rate(rate)
        .with_frame_period(cfg.tick_period());
    let app = GraphicalSimulationApp::new(
        runner::APP_TITLE,
        args::data_dir(&args.data_path),
        render,
        cfg.helpers,
        SimWindow::new(),
        &mut sim,
        shutdown.clone(),
    );
    let options = NodeOptions::graphical(node_name).with_tick_period(cfg.tick_period());
    runner::serve(options, app, shutdown, bridge)?;

    info!(steps = sim.steps(), "simulation done");
    Ok(())
}
