//! Process-level plumbing shared by both binaries.

use std::net::SocketAddr;

use colored::Colorize;
use sfros_app::{NodeOptions, SimulationApp, SimulatorNode};
use sfros_middleware::{ServiceBridge, ShutdownSignal};
use sfros_types::SimError;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Window and log title of the simulator.
pub const APP_TITLE: &str = "Stonefish Simulator";

// ────────────────────────────────────────────────────────────────────────────
// Console output
// ────────────────────────────────────────────────────────────────────────────

pub fn print_banner(node_name: &str, mode: &str) {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║         Stonefish Simulator          ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!(
        "  {} {}",
        node_name.bold(),
        format!("v{} ({mode})", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}

/// Print `err` to stderr in the style of the banner.
pub fn report_error(err: &SimError) {
    eprintln!("{}: {}", "Error".red().bold(), err);
}

// ────────────────────────────────────────────────────────────────────────────
// Ctrl-C
// ────────────────────────────────────────────────────────────────────────────

/// Raise `shutdown` on Ctrl-C.  Failure to install the handler is logged and
/// otherwise ignored.
pub fn install_ctrlc(shutdown: &ShutdownSignal) {
    let signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the simulator …".yellow().bold());
        signal.request("ctrl-c");
    }) {
        warn!(
            error = %e,
            "Failed to install Ctrl-C handler; the simulator can only be stopped from its window"
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Node
// ────────────────────────────────────────────────────────────────────────────

/// Start `app` inside a node and spin it on a current-thread runtime until
/// the simulation ends or shutdown is requested.
///
/// With a `bridge` address the node's services are also served over
/// WebSocket on the same runtime.  The address is bound before the app
/// starts.
pub fn serve<A: SimulationApp>(
    options: NodeOptions,
    app: A,
    shutdown: ShutdownSignal,
    bridge: Option<SocketAddr>,
) -> Result<(), SimError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SimError::engine("runtime", e.to_string()))?;

    let listener = match bridge {
        Some(addr) => Some(runtime.block_on(TcpListener::bind(addr)).map_err(|e| {
            SimError::Channel(format!("Failed to bind service bridge on {addr}: {e}"))
        })?),
        None => None,
    };

    let name = options.name.clone();
    let advertised = options.services.clone();
    let (node, client) = SimulatorNode::new(options, app, shutdown)?;
    let app = runtime.block_on(async move {
        let bridge_task = listener
            .map(|listener| tokio::spawn(ServiceBridge::new(client, advertised).serve(listener)));
        let result = node.spin().await;
        if let Some(task) = bridge_task {
            task.abort();
        }
        result
    })?;
    info!(node = %name, state = %app.state(), "simulator node exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use sfros_app::ConsoleSimulationApp;
    use sfros_engine::SimulationManager;
    use sfros_engine::sim::{LifecycleCall, SimManager};
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    #[test]
    fn serve_runs_a_finite_scenario_to_completion() {
        let mut sim = SimManager::new().finish_after(3);
        let shutdown = ShutdownSignal::new();
        let app = ConsoleSimulationApp::new(APP_TITLE, "/data/", &mut sim);
        let options = NodeOptions::console("nogpu").with_tick_period(Duration::from_millis(1));

        serve(options, app, shutdown.clone(), None).unwrap();

        assert!(shutdown.is_requested());
        assert_eq!(sim.steps(), 3);
        assert_eq!(sim.count(LifecycleCall::CleanUp), 1);
    }

    #[test]
    fn serve_stops_at_once_when_already_signalled() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        shutdown.request("before start");
        let app = ConsoleSimulationApp::new(APP_TITLE, "/data/", &mut sim);

        serve(NodeOptions::console("nogpu"), app, shutdown, None).unwrap();

        assert_eq!(sim.count(LifecycleCall::StartSimulation), 1);
        assert_eq!(sim.count(LifecycleCall::CleanUp), 1);
    }

    #[test]
    fn serve_reports_startup_failure() {
        let mut sim = SimManager::new();
        sim.initialize(&sfros_types::AppSettings::new("other", "/data/")).unwrap();
        let app = ConsoleSimulationApp::new(APP_TITLE, "/data/", &mut sim);
        let err =
            serve(NodeOptions::console("nogpu"), app, ShutdownSignal::new(), None).unwrap_err();
        assert!(matches!(err, SimError::Engine { .. }));
    }

    fn free_local_addr() -> SocketAddr {
        let socket = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        socket.local_addr().unwrap()
    }

    #[test]
    fn serve_answers_calls_from_the_websocket_bridge() {
        let addr = free_local_addr();
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        let app = ConsoleSimulationApp::new(APP_TITLE, "/data/", &mut sim);
        let options = NodeOptions::console("nogpu").with_tick_period(Duration::from_millis(1));

        let remote = shutdown.clone();
        let caller = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let reply = runtime.block_on(async {
                let url = format!("ws://{addr}");
                let mut ws = None;
                for _ in 0..500 {
                    if let Ok((stream, _)) = tokio_tungstenite::connect_async(url.as_str()).await {
                        ws = Some(stream);
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                let mut ws = ws.expect("bridge accepts connections");
                let call = r#"{"op":"call_service","id":"p","service":"/pause_simulation"}"#;
                ws.send(Message::Text(String::from(call).into())).await.unwrap();
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    other => panic!("unexpected frame: {other:?}"),
                }
            });
            remote.request("bridge call answered");
            reply
        });

        serve(options, app, shutdown, Some(addr)).unwrap();

        let reply: serde_json::Value = serde_json::from_str(&caller.join().unwrap()).unwrap();
        assert_eq!(reply["result"], true);
        assert_eq!(reply["values"]["message"], "Simulation paused successfully.");
        assert_eq!(sim.count(LifecycleCall::StopSimulation), 1);
        assert_eq!(sim.count(LifecycleCall::CleanUp), 1);
    }

    #[test]
    fn serve_fails_before_startup_when_bridge_address_is_taken() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut sim = SimManager::new();
        let app = ConsoleSimulationApp::new(APP_TITLE, "/data/", &mut sim);
        let addr = taken.local_addr().unwrap();

        let err = serve(NodeOptions::console("nogpu"), app, ShutdownSignal::new(), Some(addr))
            .unwrap_err();
        assert!(matches!(err, SimError::Channel(_)));
        assert_eq!(sim.count(LifecycleCall::Initialize), 0);
    }
}
