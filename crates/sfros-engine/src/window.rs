//! Windowed application surface and per-frame hooks.
//!
//! [`Window::loop_internal`] is the engine's frame: it pumps input, advances
//! the simulation, renders the scene and the base overlay, and gives the
//! application a chance to react through [`FrameHooks`].  The base handlers
//! always run before the hooks.

use sfros_types::{AppSettings, HelperSettings, RenderSettings, SimError};

use crate::entity::EntityId;
use crate::input::{InputEvent, KeyEvent, KeyEventKind};
use crate::manager::SimulationManager;
use crate::overlay::Overlay;

/// Entity currently picked in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub entity: EntityId,
    /// Sub-part of a compound entity (link, collision shape), 0 otherwise.
    pub sub_index: usize,
}

/// Everything an overlay hook may use while drawing one frame.
pub struct HudContext<'a> {
    /// `None` when the overlay system is unavailable for this frame.
    pub gui: Option<&'a mut dyn Overlay>,
    pub selection: Option<Selection>,
    pub sim: &'a dyn SimulationManager,
}

/// Application hooks invoked by [`Window::loop_internal`].
pub trait FrameHooks {
    /// Called for every key-down event, after the window's own handler.
    fn key_down(&mut self, _event: &KeyEvent) {}

    /// Called once per frame, after the base overlay has been drawn.
    fn do_hud(&mut self, _ctx: HudContext<'_>) {}
}

/// Hooks that add nothing to the base frame.
pub struct NoHooks;

impl FrameHooks for NoHooks {}

/// The graphical engine's window and render loop.
pub trait Window {
    /// Create the window and renderer.
    fn open(
        &mut self,
        settings: &AppSettings,
        render: &RenderSettings,
        helpers: &HelperSettings,
    ) -> Result<(), SimError>;

    /// Drain input gathered since the previous frame.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Base key handling (quit on Escape, console toggles, ...).
    fn key_down(&mut self, event: &KeyEvent, sim: &mut dyn SimulationManager);

    fn render_scene(&mut self, sim: &dyn SimulationManager) -> Result<(), SimError>;

    /// Draw the engine's own overlay panels.
    fn do_hud(&mut self, sim: &dyn SimulationManager);

    /// The overlay for the current frame, if one is available.
    fn gui(&mut self) -> Option<&mut dyn Overlay>;

    fn selected_entity(&self) -> Option<Selection>;

    /// Swap buffers.
    fn present(&mut self);

    /// Destroy the window and renderer.
    fn close(&mut self);

    /// Run one full frame.
    fn loop_internal(
        &mut self,
        sim: &mut dyn SimulationManager,
        hooks: &mut dyn FrameHooks,
    ) -> Result<(), SimError> {
        for event in self.poll_events() {
            match event {
                InputEvent::Quit => sim.request_finish(),
                InputEvent::Key(key) if key.kind == KeyEventKind::Down => {
                    self.key_down(&key, sim);
                    hooks.key_down(&key);
                }
                InputEvent::Key(_) => {}
            }
        }

        sim.advance_frame()?;
        self.render_scene(sim)?;
        self.do_hud(sim);

        let selection = self.selected_entity();
        hooks.do_hud(HudContext {
            gui: self.gui(),
            selection,
            sim: &*sim,
        });

        self.present();
        Ok(())
    }
}
