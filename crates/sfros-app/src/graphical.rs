//! Windowed adapter.
//!
//! Each [`tick`][SimulationApp::tick] runs one frame of the engine's own loop
//! with [`HudOverlay`] plugged in as the frame hooks.  The first tick that
//! observes [`SimulationState::Finished`] tears the engine down, closes the
//! window and raises the runtime [`ShutdownSignal`]; that happens once.

use std::path::PathBuf;

use sfros_engine::{SimulationManager, Window};
use sfros_middleware::ShutdownSignal;
use sfros_types::{AppSettings, HelperSettings, RenderSettings, SimError, SimulationState};
use tracing::info;

use crate::app::{SimulationApp, TickOutcome};
use crate::hud::{HudOverlay, HudState};

/// Runs the engine in a window with the debug panels.
pub struct GraphicalSimulationApp<'m, M: SimulationManager, W: Window> {
    settings: AppSettings,
    render: RenderSettings,
    helpers: HelperSettings,
    sim: &'m mut M,
    window: W,
    hud: HudOverlay,
    shutdown: ShutdownSignal,
    torn_down: bool,
}

impl<'m, M: SimulationManager, W: Window> GraphicalSimulationApp<'m, M, W> {
    /// `render` and `helpers` are handed to the window unchanged when it
    /// opens.  `shutdown` is raised when the simulation finishes.
    pub fn new(
        title: impl Into<String>,
        data_path: impl Into<PathBuf>,
        render: RenderSettings,
        helpers: HelperSettings,
        window: W,
        sim: &'m mut M,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            settings: AppSettings::new(title, data_path),
            render,
            helpers,
            sim,
            window,
            hud: HudOverlay::new(),
            shutdown,
            torn_down: false,
        }
    }

    pub fn hud_state(&self) -> HudState {
        self.hud.state()
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn simulation_manager(&self) -> &M {
        &*self.sim
    }

    fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.sim.clean_up();
        self.window.close();
    }
}

impl<M: SimulationManager, W: Window> SimulationApp for GraphicalSimulationApp<'_, M, W> {
    fn startup(&mut self) -> Result<(), SimError> {
        self.window.open(&self.settings, &self.render, &self.helpers)?;
        self.sim.initialize(&self.settings)?;
        self.sim.start_simulation()
    }

    /// Release the engine and the window unless a finished tick already did.
    fn shutdown(&mut self) {
        self.tear_down();
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

    fn tick(&mut self) -> Result<TickOutcome, SimError> {
        if self.torn_down {
            return Ok(TickOutcome::Finished);
        }

        self.window.loop_internal(&mut *self.sim, &mut self.hud)?;

        if self.sim.state() != SimulationState::Finished {
            return Ok(TickOutcome::Running);
        }
        info!(title = %self.settings.title, "simulation finished; closing window");
        self.tear_down();
        self.shutdown.request("simulation finished");
        Ok(TickOutcome::Finished)
    }

    fn state(&self) -> SimulationState {
        self.sim.state()
    }

    fn simulation_manager_mut(&mut self) -> &mut dyn SimulationManager {
        &mut *self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::{POSE_PANEL_KEY, VIEW_PANEL_KEY};
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};
    use sfros_engine::sim::{BASE_HUD_PREFIX, LifecycleCall, SimManager, SimWindow};
    use sfros_engine::{EntityId, InputEvent, Keycode, Selection};
    use sfros_types::{QualityPreset, RenderQuality};

    fn app<'m>(
        sim: &'m mut SimManager,
        shutdown: &ShutdownSignal,
    ) -> GraphicalSimulationApp<'m, SimManager, SimWindow> {
        GraphicalSimulationApp::new(
            "Stonefish Simulator",
            "/data/",
            RenderSettings::with_preset(800, 600, QualityPreset::Low),
            HelperSettings::default(),
            SimWindow::new(),
            sim,
            shutdown.clone(),
        )
    }

    #[test]
    fn startup_opens_window_with_settings_then_starts() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        {
            let mut app = app(&mut sim, &shutdown);
            app.startup().unwrap();
            assert!(app.window().is_open());
            let (settings, render, helpers) = app.window().opened_with().unwrap();
            assert_eq!(settings.title, "Stonefish Simulator");
            assert_eq!(render.window_w, 800);
            assert_eq!(render.ao, RenderQuality::Disabled);
            assert_eq!(*helpers, HelperSettings::default());
        }
        assert_eq!(
            sim.calls(),
            &[LifecycleCall::Initialize, LifecycleCall::StartSimulation]
        );
    }

    #[test]
    fn running_tick_neither_cleans_up_nor_signals() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        {
            let mut app = app(&mut sim, &shutdown);
            app.startup().unwrap();
            for _ in 0..3 {
                assert_eq!(app.tick().unwrap(), TickOutcome::Running);
            }
            assert!(app.window().is_open());
            assert_eq!(app.window().frames(), 3);
        }
        assert_eq!(sim.count(LifecycleCall::CleanUp), 0);
        assert!(!shutdown.is_requested());
    }

    #[test]
    fn finished_tick_tears_down_exactly_once() {
        let mut sim = SimManager::new().finish_after(2);
        let shutdown = ShutdownSignal::new();
        {
            let mut app = app(&mut sim, &shutdown);
            app.startup().unwrap();
            assert_eq!(app.tick().unwrap(), TickOutcome::Running);
            assert_eq!(app.tick().unwrap(), TickOutcome::Finished);
            assert!(shutdown.is_requested());
            assert!(!app.window().is_open());

            // Later ticks and an explicit shutdown change nothing.
            assert_eq!(app.tick().unwrap(), TickOutcome::Finished);
            app.shutdown();
            assert_eq!(app.window().close_count(), 1);
            assert_eq!(app.window().frames(), 2);
        }
        assert_eq!(sim.count(LifecycleCall::CleanUp), 1);
        assert_eq!(shutdown.request_count(), 1);
    }

    #[test]
    fn escape_key_finishes_on_the_same_tick() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        {
            let mut app = app(&mut sim, &shutdown);
            app.startup().unwrap();
            app.window_mut().press(Keycode::Escape);
            assert_eq!(app.tick().unwrap(), TickOutcome::Finished);
        }
        assert_eq!(sim.count(LifecycleCall::RequestFinish), 1);
        assert_eq!(sim.count(LifecycleCall::CleanUp), 1);
        assert!(shutdown.is_requested());
    }

    #[test]
    fn quit_event_finishes() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        let mut app = app(&mut sim, &shutdown);
        app.startup().unwrap();
        app.window_mut().push_event(InputEvent::Quit);
        assert_eq!(app.tick().unwrap(), TickOutcome::Finished);
        assert!(shutdown.is_requested());
    }

    #[test]
    fn tick_draws_base_hud_then_pose_panel() {
        let transform = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::identity(),
        );
        let mut sim = SimManager::new().with_body("auv", transform);
        let shutdown = ShutdownSignal::new();
        let mut app = app(&mut sim, &shutdown);
        app.startup().unwrap();
        app.window_mut().select(Some(Selection {
            entity: EntityId(0),
            sub_index: 0,
        }));
        app.tick().unwrap();

        let labels = app.window().overlay().unwrap().labels();
        assert!(labels[0].starts_with(BASE_HUD_PREFIX));
        assert_eq!(&labels[1..3], &["SELECTED POSE", "XYZ: 1.000 2.000 3.000"]);
        assert!(labels[3].starts_with("RPY[deg]: "));
    }

    #[test]
    fn panel_keys_reach_hud_after_base_handler() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        let mut app = app(&mut sim, &shutdown);
        app.startup().unwrap();

        app.window_mut().press(POSE_PANEL_KEY);
        app.window_mut().press(VIEW_PANEL_KEY);
        app.tick().unwrap();

        let state = app.hud_state();
        assert!(!state.show_pose_panel);
        assert!(state.show_view_panel);
        assert_eq!(app.window().base_keys().len(), 2);
        let labels = app.window().overlay().unwrap().labels();
        assert_eq!(&labels[1..], &["FREE CAMERA", "Trackball not available."]);
    }

    #[test]
    fn no_gui_still_ticks() {
        let mut sim = SimManager::new().finish_after(1);
        let shutdown = ShutdownSignal::new();
        let mut app = GraphicalSimulationApp::new(
            "t",
            "/data/",
            RenderSettings::default(),
            HelperSettings::default(),
            SimWindow::without_gui(),
            &mut sim,
            shutdown.clone(),
        );
        app.startup().unwrap();
        assert_eq!(app.tick().unwrap(), TickOutcome::Finished);
        assert!(shutdown.is_requested());
    }

    #[test]
    fn render_failure_propagates() {
        let mut sim = SimManager::new();
        let shutdown = ShutdownSignal::new();
        let mut app = app(&mut sim, &shutdown);
        // Never opened.
        let err = app.tick().unwrap_err();
        assert!(matches!(err, SimError::Engine { .. }));
        assert!(!shutdown.is_requested());
    }
}
