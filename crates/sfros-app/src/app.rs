//! The lifecycle contract shared by both adapters.

use sfros_engine::SimulationManager;
use sfros_types::{SimError, SimulationState};

/// Result of one periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking.
    Running,
    /// The simulation reached its terminal state; further ticks do nothing.
    Finished,
}

/// Lifecycle entry points a node drives.
///
/// Every call runs synchronously on the caller's thread.
pub trait SimulationApp {
    /// Initialise the engine and begin simulating.
    fn startup(&mut self) -> Result<(), SimError>;

    /// Release engine resources.
    fn shutdown(&mut self);

    /// Advance exactly one simulation step.
    fn step(&mut self) -> Result<(), SimError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// One iteration of the periodic driver.
    fn tick(&mut self) -> Result<TickOutcome, SimError>;

    fn state(&self) -> SimulationState;

    /// The simulation manager lent to this application.
    fn simulation_manager_mut(&mut self) -> &mut dyn SimulationManager;
}
