//! `sfros-app` – Simulator Applications
//!
//! Adapters that run the simulation engine as a middleware node.
//!
//! # Modules
//!
//! - [`app`] – [`SimulationApp`][app::SimulationApp]: the lifecycle every
//!   adapter exposes to the node (startup, tick, step, pause, resume,
//!   shutdown).
//! - [`console`] – [`ConsoleSimulationApp`][console::ConsoleSimulationApp]:
//!   headless adapter; each lifecycle call is a straight forward to the
//!   simulation manager.
//! - [`graphical`] – [`GraphicalSimulationApp`][graphical::GraphicalSimulationApp]:
//!   windowed adapter; runs the engine's frame, adds the debug panels, and
//!   raises the runtime shutdown signal when the simulation finishes.
//! - [`hud`] – the selected-pose and free-camera debug panels and their
//!   keyboard toggles.
//! - [`node`] – [`SimulatorNode`][node::SimulatorNode]: binds an adapter to
//!   the trigger services and a tick timer, and spins until shutdown.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP export.

pub mod app;
pub mod console;
pub mod graphical;
pub mod hud;
pub mod node;
pub mod telemetry;

pub use app::{SimulationApp, TickOutcome};
pub use console::ConsoleSimulationApp;
pub use graphical::GraphicalSimulationApp;
pub use hud::{HudOverlay, HudState, PanelContent};
pub use node::{NodeOptions, SimulatorNode};
pub use telemetry::{TracerProviderGuard, init_tracing};
