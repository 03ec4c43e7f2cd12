//! Headless adapter.
//!
//! Every lifecycle call is forwarded unchanged to the simulation manager;
//! the adapter adds no logic of its own.

use std::path::PathBuf;

use sfros_engine::SimulationManager;
use sfros_types::{AppSettings, SimError, SimulationState};

use crate::app::{SimulationApp, TickOutcome};

/// Runs the engine without a window.
pub struct ConsoleSimulationApp<'m, M: SimulationManager> {
    settings: AppSettings,
    sim: &'m mut M,
}

impl<'m, M: SimulationManager> ConsoleSimulationApp<'m, M> {
    /// Wrap `sim` for the lifetime of the application.  `title` and
    /// `data_path` are handed to the engine at startup.
    pub fn new(title: impl Into<String>, data_path: impl Into<PathBuf>, sim: &'m mut M) -> Self {
        Self {
            settings: AppSettings::new(title, data_path),
            sim,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn simulation_manager(&self) -> &M {
        &*self.sim
    }
}

impl<M: SimulationManager> SimulationApp for ConsoleSimulationApp<'_, M> {
    fn startup(&mut self) -> Result<(), SimError> {
        self.sim.initialize(&self.settings)?;
        self.sim.start_simulation()
    }

    fn shutdown(&mut self) {
        self.sim.clean_up();
    }

    fn step(&mut self) -> Result<(), SimError> {
        self.sim.step_simulation()
    }

    fn pause(&mut self) {
        self.sim.stop_simulation();
    }

    fn resume(&mut self) {
        self.sim.resume_simulation();
    }

    /// Advance the running simulation by one driver frame.  Teardown is left
    /// to the node once it stops spinning.
    fn tick(&mut self) -> Result<TickOutcome, SimError> {
        self.sim.advance_frame()?;
        if self.sim.state().is_terminal() {
            return Ok(TickOutcome::Finished);
        }
        Ok(TickOutcome::Running)
    }

    fn state(&self) -> SimulationState {
        self.sim.state()
    }

    fn simulation_manager_mut(&mut self) -> &mut dyn SimulationManager {
        &mut *self.sim
    }
}
