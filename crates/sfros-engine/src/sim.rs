//! In-process stand-in engine for headless runs and CI.
//!
//! [`SimManager`] and [`SimWindow`] satisfy every collaborator trait without
//! a physics solver or a GPU.  They record the lifecycle calls they receive
//! and return plausible state, so the full application stack can be driven
//! from tests and from the `nogpu` binary.
//!
//! # Example
//!
//! ```rust
//! use sfros_engine::sim::SimManager;
//! use sfros_engine::SimulationManager;
//! use sfros_types::{AppSettings, SimulationState};
//!
//! let mut sim = SimManager::new().with_static("seabed").finish_after(2);
//! sim.initialize(&AppSettings::new("demo", "/tmp/data/")).unwrap();
//! sim.start_simulation().unwrap();
//! sim.advance_frame().unwrap();
//! sim.advance_frame().unwrap();
//! assert_eq!(sim.state(), SimulationState::Finished);
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use sfros_types::{AppSettings, HelperSettings, RenderSettings, SimError, SimulationState};
use tracing::{debug, info};

use crate::camera::CameraHelper;
use crate::entity::{Entity, EntityId, MovingEntity};
use crate::input::{InputEvent, KeyEvent, Keycode};
use crate::manager::SimulationManager;
use crate::ocean::Ocean;
use crate::overlay::Overlay;
use crate::scenario::Scenario;
use crate::window::{Selection, Window};

// ────────────────────────────────────────────────────────────────────────────
// Stub entities
// ────────────────────────────────────────────────────────────────────────────

/// A rigid body held at its pose until respawned.
pub struct SimBody {
    name: String,
    transform: Isometry3<f64>,
}

impl SimBody {
    pub fn new(name: impl Into<String>, transform: Isometry3<f64>) -> Box<Self> {
        Box::new(Self {
            name: name.into(),
            transform,
        })
    }
}

impl Entity for SimBody {
    fn name(&self) -> &str {
        &self.name
    }

    fn motion(&self) -> Option<&dyn MovingEntity> {
        Some(self as &dyn MovingEntity)
    }

    fn motion_mut(&mut self) -> Option<&mut dyn MovingEntity> {
        Some(self as &mut dyn MovingEntity)
    }
}

impl MovingEntity for SimBody {
    fn cg_transform(&self) -> Isometry3<f64> {
        self.transform
    }

    fn respawn(&mut self, origin: Isometry3<f64>) {
        self.transform = origin;
    }
}

/// Fixed scenery without the motion capability.
pub struct SimStatic {
    name: String,
}

impl SimStatic {
    pub fn new(name: impl Into<String>) -> Box<Self> {
        Box::new(Self { name: name.into() })
    }
}

impl Entity for SimStatic {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Camera parked at a fixed eye position.
pub struct SimTrackball {
    eye: Vector3<f32>,
    direction: Vector3<f32>,
}

impl SimTrackball {
    pub fn new(eye: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self { eye, direction }
    }
}

impl CameraHelper for SimTrackball {
    fn eye_position(&self) -> Vector3<f32> {
        self.eye
    }

    fn looking_direction(&self) -> Vector3<f32> {
        self.direction
    }
}

pub struct SimOcean {
    water_type: f32,
    currents: bool,
}

impl Ocean for SimOcean {
    fn set_water_type(&mut self, jerlov: f32) {
        self.water_type = jerlov;
    }

    fn water_type(&self) -> f32 {
        self.water_type
    }

    fn enable_currents(&mut self) {
        self.currents = true;
    }

    fn disable_currents(&mut self) {
        self.currents = false;
    }

    fn currents_enabled(&self) -> bool {
        self.currents
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimManager
// ────────────────────────────────────────────────────────────────────────────

/// Recent lifecycle calls kept by [`SimManager::calls`].
pub const CALL_HISTORY: usize = 256;

/// Driver frame length assumed until [`SimManager::with_frame_period`].
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

/// Lifecycle calls recorded by [`SimManager`].
///
/// `advance_frame` is counted by [`SimManager::frames`] instead of being
/// logged, so long runs do not grow the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleCall {
    Initialize,
    StartSimulation,
    StepSimulation,
    StopSimulation,
    ResumeSimulation,
    CleanUp,
    RequestFinish,
}

/// Stand-in simulation manager.
///
/// Entity ids are assigned in insertion order starting at 0.  Without a step
/// rate every running frame takes one step; with one, each frame takes as
/// many steps as `rate * frame_period` accumulates.
pub struct SimManager {
    entities: Vec<Box<dyn Entity>>,
    trackball: Option<SimTrackball>,
    ocean: Option<SimOcean>,
    duration_steps: Option<u64>,
    step_rate: Option<f64>,
    frame_period: Duration,
    step_budget: f64,
    pending_respawns: Vec<(usize, Isometry3<f64>)>,
    state: SimulationState,
    settings: Option<AppSettings>,
    steps: u64,
    frames: u64,
    calls: Vec<LifecycleCall>,
    call_counts: HashMap<LifecycleCall, usize>,
}

impl Default for SimManager {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            trackball: None,
            ocean: None,
            duration_steps: None,
            step_rate: None,
            frame_period: DEFAULT_FRAME_PERIOD,
            step_budget: 0.0,
            pending_respawns: Vec::new(),
            state: SimulationState::default(),
            settings: None,
            steps: 0,
            frames: 0,
            calls: Vec::new(),
            call_counts: HashMap::new(),
        }
    }
}

impl SimManager {
    /// Create an empty manager that runs until stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a manager from a parsed [`Scenario`].
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut sim = Self::new();
        for body in &scenario.bodies {
            let [x, y, z] = body.position;
            let [roll, pitch, yaw] = body.rpy;
            let transform = Isometry3::from_parts(
                Translation3::new(x, y, z),
                UnitQuaternion::from_euler_angles(roll, pitch, yaw),
            );
            sim = sim.with_entity(SimBody::new(body.name.clone(), transform));
        }
        for s in &scenario.statics {
            sim = sim.with_entity(SimStatic::new(s.name.clone()));
        }
        if let Some(tb) = &scenario.trackball {
            sim = sim.with_trackball(Vector3::from(tb.eye), Vector3::from(tb.direction));
        }
        if let Some(ocean) = &scenario.ocean {
            sim = sim.with_ocean(ocean.jerlov);
            if let Some(o) = sim.ocean.as_mut() {
                o.currents = ocean.currents;
            }
        }
        sim.duration_steps = scenario.duration_steps;
        sim
    }

    /// Register any entity.
    pub fn with_entity(mut self, entity: Box<dyn Entity>) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_body(self, name: impl Into<String>, transform: Isometry3<f64>) -> Self {
        self.with_entity(SimBody::new(name, transform))
    }

    pub fn with_static(self, name: impl Into<String>) -> Self {
        self.with_entity(SimStatic::new(name))
    }

    pub fn with_trackball(mut self, eye: Vector3<f32>, direction: Vector3<f32>) -> Self {
        self.trackball = Some(SimTrackball::new(eye, direction));
        self
    }

    pub fn with_ocean(mut self, jerlov: f32) -> Self {
        self.ocean = Some(SimOcean {
            water_type: jerlov,
            currents: true,
        });
        self
    }

    /// Report `Finished` once `steps` simulation steps have run.
    pub fn finish_after(mut self, steps: u64) -> Self {
        self.duration_steps = Some(steps);
        self
    }

    /// Nominal simulation steps per second.
    pub fn with_step_rate(mut self, hz: f64) -> Self {
        self.step_rate = Some(hz);
        self
    }

    pub fn step_rate(&self) -> Option<f64> {
        self.step_rate
    }

    /// Wall-clock length of one driver frame.
    pub fn with_frame_period(mut self, period: Duration) -> Self {
        self.frame_period = period;
        self
    }

    /// The most recent lifecycle calls, oldest first.  At most
    /// [`CALL_HISTORY`] entries are kept.
    pub fn calls(&self) -> &[LifecycleCall] {
        &self.calls
    }

    /// How many times `call` has been received over the whole run.
    pub fn count(&self, call: LifecycleCall) -> usize {
        self.call_counts.get(&call).copied().unwrap_or(0)
    }

    /// Simulation steps taken (fixed steps and running frames).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// `advance_frame` calls received.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Settings passed to [`SimulationManager::initialize`].
    pub fn settings(&self) -> Option<&AppSettings> {
        self.settings.as_ref()
    }

    fn record(&mut self, call: LifecycleCall) {
        if self.calls.len() >= CALL_HISTORY {
            self.calls.drain(..CALL_HISTORY / 2);
        }
        self.calls.push(call);
        *self.call_counts.entry(call).or_insert(0) += 1;
    }

    /// Steps owed for one running frame.
    fn steps_for_frame(&mut self) -> u64 {
        let Some(hz) = self.step_rate else {
            return 1;
        };
        self.step_budget += hz * self.frame_period.as_secs_f64();
        let whole = self.step_budget.floor();
        self.step_budget -= whole;
        whole as u64
    }

    fn advance_one_step(&mut self) {
        self.steps += 1;
        for (index, origin) in std::mem::take(&mut self.pending_respawns) {
            if let Some(motion) = self.entities.get_mut(index).and_then(|e| e.motion_mut()) {
                motion.respawn(origin);
                info!(entity = index, "robot respawned");
            }
        }
        if let Some(limit) = self.duration_steps
            && self.steps >= limit
            && self.state != SimulationState::Finished
        {
            info!(steps = self.steps, "scenario duration reached");
            self.state = SimulationState::Finished;
        }
    }

    fn ensure_initialized(&self, stage: &str) -> Result<(), SimError> {
        if self.settings.is_none() {
            return Err(SimError::engine(stage, "simulation manager not initialised"));
        }
        Ok(())
    }
}

impl SimulationManager for SimManager {
    fn initialize(&mut self, settings: &AppSettings) -> Result<(), SimError> {
        self.record(LifecycleCall::Initialize);
        if self.settings.is_some() {
            return Err(SimError::engine("initialize", "scenario already built"));
        }
        debug!(
            title = %settings.title,
            entities = self.entities.len(),
            step_rate = ?self.step_rate,
            "scenario built"
        );
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn start_simulation(&mut self) -> Result<(), SimError> {
        self.record(LifecycleCall::StartSimulation);
        self.ensure_initialized("start_simulation")?;
        if self.state != SimulationState::Finished {
            self.state = SimulationState::Running;
        }
        Ok(())
    }

    fn step_simulation(&mut self) -> Result<(), SimError> {
        self.record(LifecycleCall::StepSimulation);
        self.ensure_initialized("step_simulation")?;
        if self.state != SimulationState::Finished {
            self.advance_one_step();
        }
        Ok(())
    }

    fn advance_frame(&mut self) -> Result<(), SimError> {
        self.frames += 1;
        if self.state != SimulationState::Running {
            return Ok(());
        }
        for _ in 0..self.steps_for_frame() {
            self.advance_one_step();
            if self.state == SimulationState::Finished {
                break;
            }
        }
        Ok(())
    }

    fn stop_simulation(&mut self) {
        self.record(LifecycleCall::StopSimulation);
        if self.state == SimulationState::Running {
            self.state = SimulationState::Stopped;
        }
    }

    fn resume_simulation(&mut self) {
        self.record(LifecycleCall::ResumeSimulation);
        if self.state == SimulationState::Stopped && self.settings.is_some() {
            self.state = SimulationState::Running;
        }
    }

    fn clean_up(&mut self) {
        self.record(LifecycleCall::CleanUp);
        debug!(steps = self.steps, "engine resources released");
    }

    fn request_finish(&mut self) {
        self.record(LifecycleCall::RequestFinish);
        self.state = SimulationState::Finished;
    }

    fn respawn_robot(&mut self, name: &str, origin: Isometry3<f64>) -> bool {
        let Some(index) = self
            .entities
            .iter()
            .position(|e| e.name() == name && e.motion().is_some())
        else {
            return false;
        };
        self.pending_respawns.retain(|(i, _)| *i != index);
        self.pending_respawns.push((index, origin));
        true
    }

    fn state(&self) -> SimulationState {
        self.state
    }

    fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(id.0).map(|e| e.as_ref())
    }

    fn trackball(&self) -> Option<&dyn CameraHelper> {
        self.trackball.as_ref().map(|t| t as &dyn CameraHelper)
    }

    fn ocean_mut(&mut self) -> Option<&mut dyn Ocean> {
        self.ocean.as_mut().map(|o| o as &mut dyn Ocean)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recording overlay
// ────────────────────────────────────────────────────────────────────────────

/// A draw call captured by [`RecordingOverlay`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Panel { x: f32, y: f32, w: f32, h: f32 },
    Label { x: f32, y: f32, text: String },
}

/// Overlay that keeps the draw calls of the current frame.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    commands: Vec<DrawCommand>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text of every label drawn this frame, in draw order.
    pub fn labels(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Label { text, .. } => Some(text.as_str()),
                DrawCommand::Panel { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Overlay for RecordingOverlay {
    fn do_panel(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Panel { x, y, w, h });
    }

    fn do_label(&mut self, x: f32, y: f32, text: &str) {
        self.commands.push(DrawCommand::Label {
            x,
            y,
            text: text.to_string(),
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimWindow
// ────────────────────────────────────────────────────────────────────────────

/// Label drawn by the base overlay of [`SimWindow`], prefixed to the state.
pub const BASE_HUD_PREFIX: &str = "Simulation ";

/// Recent key-downs kept by [`SimWindow::base_keys`].
pub const KEY_HISTORY: usize = 64;

/// Off-screen window with a scripted input queue.
pub struct SimWindow {
    is_open: bool,
    opened_with: Option<(AppSettings, RenderSettings, HelperSettings)>,
    events: VecDeque<InputEvent>,
    selection: Option<Selection>,
    overlay: Option<RecordingOverlay>,
    base_keys: Vec<KeyEvent>,
    base_key_count: usize,
    frames: u64,
    close_count: usize,
}

impl Default for SimWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWindow {
    /// Window with a recording overlay.
    pub fn new() -> Self {
        Self {
            is_open: false,
            opened_with: None,
            events: VecDeque::new(),
            selection: None,
            overlay: Some(RecordingOverlay::new()),
            base_keys: Vec::new(),
            base_key_count: 0,
            frames: 0,
            close_count: 0,
        }
    }

    /// Window whose overlay system is unavailable.
    pub fn without_gui() -> Self {
        Self {
            overlay: None,
            ..Self::new()
        }
    }

    /// Queue an event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Queue a full key press (down then up).
    pub fn press(&mut self, key: Keycode) {
        self.push_event(InputEvent::Key(KeyEvent::down(key)));
        self.push_event(InputEvent::Key(KeyEvent::up(key)));
    }

    pub fn select(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn overlay(&self) -> Option<&RecordingOverlay> {
        self.overlay.as_ref()
    }

    /// The most recent key events seen by the base handler, oldest first.
    pub fn base_keys(&self) -> &[KeyEvent] {
        &self.base_keys
    }

    /// Key events seen by the base handler over the window's lifetime.
    pub fn base_key_count(&self) -> usize {
        self.base_key_count
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn close_count(&self) -> usize {
        self.close_count
    }

    pub fn opened_with(&self) -> Option<&(AppSettings, RenderSettings, HelperSettings)> {
        self.opened_with.as_ref()
    }
}

impl Window for SimWindow {
    fn open(
        &mut self,
        settings: &AppSettings,
        render: &RenderSettings,
        helpers: &HelperSettings,
    ) -> Result<(), SimError> {
        if self.is_open {
            return Err(SimError::engine("open", "window already open"));
        }
        debug!(
            title = %settings.title,
            width = render.window_w,
            height = render.window_h,
            "window opened"
        );
        self.opened_with = Some((settings.clone(), *render, *helpers));
        self.is_open = true;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }

    fn key_down(&mut self, event: &KeyEvent, sim: &mut dyn SimulationManager) {
        if self.base_keys.len() >= KEY_HISTORY {
            self.base_keys.drain(..KEY_HISTORY / 2);
        }
        self.base_keys.push(*event);
        self.base_key_count += 1;
        if event.key == Keycode::Escape {
            sim.request_finish();
        }
    }

    fn render_scene(&mut self, _sim: &dyn SimulationManager) -> Result<(), SimError> {
        if !self.is_open {
            return Err(SimError::engine("render_scene", "window not open"));
        }
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear();
        }
        Ok(())
    }

    fn do_hud(&mut self, sim: &dyn SimulationManager) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.do_label(10.0, 10.0, &format!("{BASE_HUD_PREFIX}{}", sim.state()));
        }
    }

    fn gui(&mut self) -> Option<&mut dyn Overlay> {
        self.overlay.as_mut().map(|o| o as &mut dyn Overlay)
    }

    fn selected_entity(&self) -> Option<Selection> {
        self.selection
    }

    fn present(&mut self) {
        self.frames += 1;
    }

    fn close(&mut self) {
        self.is_open = false;
        self.close_count += 1;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
