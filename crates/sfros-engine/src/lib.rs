//! `sfros-engine` – Engine Collaborator Contracts
//!
//! The simulation engine lives outside this workspace.  This crate names the
//! surface the application adapters call into, as a set of traits, and ships
//! an in-process stand-in that satisfies all of them.
//!
//! # Modules
//!
//! - [`manager`] – [`SimulationManager`][manager::SimulationManager]: the
//!   engine's lifecycle (initialise, start, step, pause, resume, clean up),
//!   robot respawn, and its queries (state, entities, trackball, ocean).
//! - [`window`] – [`Window`][window::Window] and
//!   [`FrameHooks`][window::FrameHooks]: the windowed application surface and
//!   the per-frame hooks an application may add on top of the base loop.
//! - [`entity`] – [`Entity`][entity::Entity] with the optional
//!   [`MovingEntity`][entity::MovingEntity] capability.
//! - [`camera`], [`ocean`], [`overlay`], [`input`] – the remaining narrow
//!   collaborator traits and value types.
//! - [`sim`] / [`scenario`] – stand-in engine driven by a small TOML
//!   scenario, for headless runs and tests.

pub mod camera;
pub mod entity;
pub mod input;
pub mod manager;
pub mod ocean;
pub mod overlay;
pub mod scenario;
pub mod sim;
pub mod window;

pub use camera::CameraHelper;
pub use entity::{Entity, EntityId, MovingEntity};
pub use input::{InputEvent, KeyEvent, KeyEventKind, Keycode};
pub use manager::SimulationManager;
pub use ocean::Ocean;
pub use overlay::Overlay;
pub use scenario::Scenario;
pub use window::{FrameHooks, HudContext, NoHooks, Selection, Window};
