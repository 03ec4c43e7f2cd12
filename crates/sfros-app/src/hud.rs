//! Debug overlay for the windowed adapter.
//!
//! Two panels are stacked from the top-left corner of the overlay:
//!
//! | Key | Panel | Shown at start |
//! |---|---|---|
//! | F6 | selected body pose | yes |
//! | F7 | free camera | no |
//!
//! Panel content is computed by pure functions ([`pose_panel`],
//! [`view_panel`]) so it can be checked without an overlay; [`HudOverlay`]
//! only lays the panels out and draws them.

use nalgebra::{Isometry3, Vector3};
use sfros_engine::{
    FrameHooks, HudContext, KeyEvent, KeyEventKind, Keycode, Overlay, Selection, SimulationManager,
};
use tracing::debug;

/// Toggles the selected-pose panel.
pub const POSE_PANEL_KEY: Keycode = Keycode::F(6);
/// Toggles the free-camera panel.
pub const VIEW_PANEL_KEY: Keycode = Keycode::F(7);

const PANEL_X: f32 = 10.0;
const PANEL_TOP: f32 = 755.0;
const PANEL_W: f32 = 230.0;
const POSE_PANEL_H: f32 = 86.0;
const VIEW_PANEL_H: f32 = 82.0;

const PANEL_PAD: f32 = 6.0;
const TITLE_ADVANCE: f32 = 16.0;
const LINE_ADVANCE: f32 = 14.0;
const TITLE_INDENT: f32 = 6.0;
const LINE_INDENT: f32 = 8.0;

// ────────────────────────────────────────────────────────────────────────────
// Visibility
// ────────────────────────────────────────────────────────────────────────────

/// Which panels are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudState {
    pub show_pose_panel: bool,
    pub show_view_panel: bool,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            show_pose_panel: true,
            show_view_panel: false,
        }
    }
}

impl HudState {
    /// State after `event`.  Only key-down events of the two panel keys have
    /// an effect.
    pub fn apply(self, event: &KeyEvent) -> Self {
        if event.kind != KeyEventKind::Down {
            return self;
        }
        let mut next = self;
        match event.key {
            k if k == POSE_PANEL_KEY => next.show_pose_panel = !next.show_pose_panel,
            k if k == VIEW_PANEL_KEY => next.show_view_panel = !next.show_view_panel,
            _ => {}
        }
        next
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Panel content
// ────────────────────────────────────────────────────────────────────────────

/// Title, fixed height and text lines of one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelContent {
    pub title: &'static str,
    pub height: f32,
    pub lines: Vec<String>,
}

impl PanelContent {
    /// Draw the panel with its top edge at `*y` and move `*y` below it.
    pub fn render(&self, gui: &mut dyn Overlay, x: f32, y: &mut f32) {
        let mut yy = *y;
        gui.do_panel(x, yy, PANEL_W, self.height);
        yy += PANEL_PAD;
        gui.do_label(x + TITLE_INDENT, yy, self.title);
        yy += TITLE_ADVANCE;
        for line in &self.lines {
            gui.do_label(x + LINE_INDENT, yy, line);
            yy += LINE_ADVANCE;
        }
        *y = yy + PANEL_PAD;
    }
}

/// Content of the selected-pose panel.
///
/// Only entities with the motion capability report a pose; the transform is
/// read once per call.
pub fn pose_panel(sim: &dyn SimulationManager, selection: Option<Selection>) -> PanelContent {
    let lines = match selection.and_then(|s| sim.entity(s.entity)) {
        None => vec!["No selection.".to_string()],
        Some(entity) => match entity.motion() {
            Some(moving) => pose_lines(&moving.cg_transform()),
            None => vec![
                "(Static/Dynamic entity)".to_string(),
                "Select body for pose.".to_string(),
            ],
        },
    };
    PanelContent {
        title: "SELECTED POSE",
        height: POSE_PANEL_H,
        lines,
    }
}

/// Position in metres and Z-Y-X Euler angles in degrees, roll first.
pub fn pose_lines(transform: &Isometry3<f64>) -> Vec<String> {
    let p = transform.translation.vector;
    let (roll, pitch, yaw) = transform.rotation.euler_angles();
    vec![
        format!("XYZ: {} {} {}", fixed(p.x, 3), fixed(p.y, 3), fixed(p.z, 3)),
        format!(
            "RPY[deg]: {} {} {}",
            fixed(roll.to_degrees(), 1),
            fixed(pitch.to_degrees(), 1),
            fixed(yaw.to_degrees(), 1)
        ),
    ]
}

/// `value` with `decimals` places.  Values that round to zero print
/// unsigned, so `-0.0` and `-0.0001` both read `0.0`.
pub fn fixed(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    match text.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_string()
        }
        _ => text,
    }
}

fn fixed_xyz(v: &Vector3<f32>) -> String {
    let [x, y, z] = [v.x, v.y, v.z].map(|c| fixed(f64::from(c), 2));
    format!("{x} {y} {z}")
}

/// Content of the free-camera panel.
pub fn view_panel(sim: &dyn SimulationManager) -> PanelContent {
    let lines = match sim.trackball() {
        Some(camera) => {
            let eye = camera.eye_position();
            let dir = camera.looking_direction();
            vec![
                format!("Pos: {}", fixed_xyz(&eye)),
                format!("Dir: {}", fixed_xyz(&dir)),
            ]
        }
        None => vec!["Trackball not available.".to_string()],
    };
    PanelContent {
        title: "FREE CAMERA",
        height: VIEW_PANEL_H,
        lines,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HudOverlay
// ────────────────────────────────────────────────────────────────────────────

/// Frame hooks of the windowed adapter: panel toggles and drawing.
#[derive(Debug, Default)]
pub struct HudOverlay {
    state: HudState,
}

impl HudOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HudState {
        self.state
    }
}

impl FrameHooks for HudOverlay {
    fn key_down(&mut self, event: &KeyEvent) {
        let next = self.state.apply(event);
        if next != self.state {
            debug!(
                pose = next.show_pose_panel,
                view = next.show_view_panel,
                "hud panels toggled"
            );
        }
        self.state = next;
    }

    fn do_hud(&mut self, ctx: HudContext<'_>) {
        let Some(gui) = ctx.gui else {
            return;
        };
        let mut y = PANEL_TOP;
        if self.state.show_pose_panel {
            pose_panel(ctx.sim, ctx.selection).render(gui, PANEL_X, &mut y);
        }
        if self.state.show_view_panel {
            view_panel(ctx.sim).render(gui, PANEL_X, &mut y);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::f64::consts::FRAC_PI_2;
    use std::rc::Rc;

    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use sfros_engine::sim::{DrawCommand, RecordingOverlay, SimManager};
    use sfros_engine::{Entity, EntityId, MovingEntity};

    use super::*;

    fn select(id: usize) -> Option<Selection> {
        Some(Selection {
            entity: EntityId(id),
            sub_index: 0,
        })
    }

    fn numbers(line: &str) -> Vec<f64> {
        line.split_whitespace()
            .skip(1)
            .map(|n| n.parse().expect("number"))
            .collect()
    }

    fn draw(
        hud: &mut HudOverlay,
        sim: &SimManager,
        selection: Option<Selection>,
    ) -> RecordingOverlay {
        let mut overlay = RecordingOverlay::new();
        hud.do_hud(HudContext {
            gui: Some(&mut overlay),
            selection,
            sim,
        });
        overlay
    }

    #[test]
    fn default_shows_pose_panel_only() {
        let state = HudState::default();
        assert!(state.show_pose_panel);
        assert!(!state.show_view_panel);
    }

    #[test]
    fn panel_keys_toggle_on_key_down() {
        let state = HudState::default();
        let state = state.apply(&KeyEvent::down(POSE_PANEL_KEY));
        assert!(!state.show_pose_panel);
        let state = state.apply(&KeyEvent::down(POSE_PANEL_KEY));
        assert!(state.show_pose_panel);

        let state = state.apply(&KeyEvent::down(VIEW_PANEL_KEY));
        assert!(state.show_view_panel);
        assert!(state.show_pose_panel);
    }

    #[test]
    fn key_up_and_other_keys_do_nothing() {
        let state = HudState::default();
        assert_eq!(state.apply(&KeyEvent::up(POSE_PANEL_KEY)), state);
        assert_eq!(state.apply(&KeyEvent::down(Keycode::F(5))), state);
        assert_eq!(state.apply(&KeyEvent::down(Keycode::Char('p'))), state);
    }

    #[test]
    fn pose_of_rotated_body() {
        let transform = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2),
        );
        let lines = pose_lines(&transform);
        assert_eq!(lines, vec!["XYZ: 1.000 2.000 3.000", "RPY[deg]: 0.0 0.0 90.0"]);
    }

    #[test]
    fn near_zero_values_print_without_sign() {
        assert_eq!(fixed(-0.0, 1), "0.0");
        assert_eq!(fixed(-1e-9, 3), "0.000");
        assert_eq!(fixed(-0.04, 1), "0.0");
        assert_eq!(fixed(-0.05001, 1), "-0.1");
        assert_eq!(fixed(0.0, 2), "0.00");

        let transform = Isometry3::from_parts(
            Translation3::new(-1e-7, -0.0, 4.0),
            UnitQuaternion::from_euler_angles(-1e-9, 0.0, -FRAC_PI_2),
        );
        assert_eq!(
            pose_lines(&transform),
            vec!["XYZ: 0.000 0.000 4.000", "RPY[deg]: 0.0 0.0 -90.0"]
        );
    }

    #[test]
    fn pose_reports_roll_pitch_yaw_order() {
        let transform = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let rpy = numbers(&pose_lines(&transform)[1]);
        assert!((rpy[0] - 5.7).abs() < 0.051);
        assert!((rpy[1] - 11.5).abs() < 0.051);
        assert!((rpy[2] - 17.2).abs() < 0.051);
    }

    #[test]
    fn pose_panel_placeholders() {
        let sim = SimManager::new().with_static("seabed");
        let none = pose_panel(&sim, None);
        assert_eq!(none.lines, vec!["No selection."]);

        let stale = pose_panel(&sim, select(7));
        assert_eq!(stale.lines, vec!["No selection."]);

        let fixed = pose_panel(&sim, select(0));
        assert_eq!(
            fixed.lines,
            vec!["(Static/Dynamic entity)", "Select body for pose."]
        );
    }

    #[test]
    fn view_panel_with_and_without_trackball() {
        let sim = SimManager::new();
        assert_eq!(view_panel(&sim).lines, vec!["Trackball not available."]);

        let sim = SimManager::new()
            .with_trackball(Vector3::new(-0.0, -5.0, 2.5), Vector3::new(-0.001, 1.0, 0.0));
        let panel = view_panel(&sim);
        assert_eq!(panel.title, "FREE CAMERA");
        assert_eq!(
            panel.lines,
            vec!["Pos: 0.00 -5.00 2.50", "Dir: 0.00 1.00 0.00"]
        );
    }

    #[test]
    fn pose_panel_layout() {
        let sim = SimManager::new().with_body("auv", Isometry3::identity());
        let mut hud = HudOverlay::new();
        let overlay = draw(&mut hud, &sim, select(0));
        let commands = overlay.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            DrawCommand::Panel {
                x: 10.0,
                y: 755.0,
                w: 230.0,
                h: 86.0
            }
        );
        assert_eq!(
            commands[1],
            DrawCommand::Label {
                x: 16.0,
                y: 761.0,
                text: "SELECTED POSE".to_string()
            }
        );
        for (command, line_y) in commands[2..].iter().zip([777.0, 791.0]) {
            assert!(
                matches!(command, DrawCommand::Label { x, y, .. } if *x == 18.0 && *y == line_y)
            );
        }
    }

    #[test]
    fn view_panel_stacks_below_pose_panel() {
        let sim = SimManager::new();
        let mut hud = HudOverlay::new();
        hud.key_down(&KeyEvent::down(VIEW_PANEL_KEY));
        let overlay = draw(&mut hud, &sim, None);
        // Pose panel: 755 + 6 + 16 + 14 (one line) + 6 = 797.
        let panels: Vec<_> = overlay
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Panel { .. }))
            .collect();
        assert_eq!(panels.len(), 2);
        assert_eq!(
            *panels[1],
            DrawCommand::Panel {
                x: 10.0,
                y: 797.0,
                w: 230.0,
                h: 82.0
            }
        );
        assert_eq!(
            overlay.labels(),
            vec![
                "SELECTED POSE",
                "No selection.",
                "FREE CAMERA",
                "Trackball not available."
            ]
        );
    }

    #[test]
    fn hidden_panels_draw_nothing() {
        let sim = SimManager::new();
        let mut hud = HudOverlay::new();
        hud.key_down(&KeyEvent::down(POSE_PANEL_KEY));
        let overlay = draw(&mut hud, &sim, None);
        assert!(overlay.commands().is_empty());
    }

    struct CountingBody {
        reads: Rc<Cell<usize>>,
    }

    impl Entity for CountingBody {
        fn name(&self) -> &str {
            "counting"
        }

        fn motion(&self) -> Option<&dyn MovingEntity> {
            Some(self as &dyn MovingEntity)
        }
    }

    impl MovingEntity for CountingBody {
        fn cg_transform(&self) -> Isometry3<f64> {
            self.reads.set(self.reads.get() + 1);
            Isometry3::identity()
        }

        fn respawn(&mut self, _origin: Isometry3<f64>) {}
    }

    #[test]
    fn transform_read_once_per_frame_and_never_without_overlay() {
        let reads = Rc::new(Cell::new(0));
        let sim = SimManager::new().with_entity(Box::new(CountingBody {
            reads: Rc::clone(&reads),
        }));
        let mut hud = HudOverlay::new();

        hud.do_hud(HudContext {
            gui: None,
            selection: select(0),
            sim: &sim,
        });
        assert_eq!(reads.get(), 0);

        let overlay = draw(&mut hud, &sim, select(0));
        assert_eq!(reads.get(), 1);
        assert_eq!(overlay.labels()[1], "XYZ: 0.000 0.000 0.000");
    }
}
