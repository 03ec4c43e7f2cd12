//! `sfros-cli` – Simulator Command Line
//!
//! Shared plumbing for the two simulator binaries:
//!
//! - `stonefish_simulator` – windowed simulator node
//!   (`<DATA_PATH> <SCENARIO> <RATE> <WINDOW_W> <WINDOW_H> <QUALITY>`).
//! - `stonefish_simulator_nogpu` – headless simulator node
//!   (`<DATA_PATH> <SCENARIO> <RATE>`).
//!
//! # Modules
//!
//! - [`args`] – `clap` argument structs and their validation.
//! - [`config`] – `~/.sfros/config.toml` load/save with `SFROS_*` overrides.
//! - [`runner`] – banner, Ctrl-C wiring and the single-threaded runtime that
//!   spins a node next to its WebSocket service bridge.

pub mod args;
pub mod config;
pub mod runner;
