//! The simulation manager contract.
//!
//! A manager owns the scenario (entities, environment, cameras) and the
//! simulation clock.  Applications never own it: it is constructed by the
//! node and lent to an adapter for the adapter's whole lifetime.

use nalgebra::Isometry3;
use sfros_types::{AppSettings, SimError, SimulationState};

use crate::camera::CameraHelper;
use crate::entity::{Entity, EntityId};
use crate::ocean::Ocean;

/// Lifecycle and query surface of the simulation engine.
///
/// # State transitions
///
/// ```text
///   Stopped ──start/resume──▶ Running ──stop──▶ Stopped
///      │                         │
///      └──────request_finish─────┴──▶ Finished (terminal)
/// ```
///
/// The engine may also enter `Finished` on its own, for example when the
/// scenario reaches its configured duration.
pub trait SimulationManager {
    /// Build the scenario and prepare the solver.
    fn initialize(&mut self, settings: &AppSettings) -> Result<(), SimError>;

    /// Begin advancing the simulation.
    fn start_simulation(&mut self) -> Result<(), SimError>;

    /// Advance exactly one fixed step regardless of the running state.
    fn step_simulation(&mut self) -> Result<(), SimError>;

    /// Advance by one driver frame; a no-op unless the state is `Running`.
    fn advance_frame(&mut self) -> Result<(), SimError>;

    /// Pause the simulation (`Running` → `Stopped`).
    fn stop_simulation(&mut self);

    /// Resume a paused simulation (`Stopped` → `Running`).
    fn resume_simulation(&mut self);

    /// Release engine resources.  Called once, after `Finished` or on
    /// shutdown.
    fn clean_up(&mut self);

    /// Move to `Finished` at the next opportunity.
    fn request_finish(&mut self);

    /// Queue the moving entity called `name` to be teleported to `origin`.
    ///
    /// The respawn takes effect at the end of the next simulation step.
    /// Returns `false` when no moving entity has that name.
    fn respawn_robot(&mut self, name: &str, origin: Isometry3<f64>) -> bool;

    fn state(&self) -> SimulationState;

    /// Look up an entity by id.  Returns `None` for stale ids.
    fn entity(&self, id: EntityId) -> Option<&dyn Entity>;

    /// The active free-camera helper, if the engine has one.
    fn trackball(&self) -> Option<&dyn CameraHelper>;

    /// The ocean, when the scenario defines one.
    fn ocean_mut(&mut self) -> Option<&mut dyn Ocean>;
}
