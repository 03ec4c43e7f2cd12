//! Ocean environment handle.

/// Water body simulated by the engine.
pub trait Ocean {
    /// Set the optical water type on the Jerlov scale, normalised to `[0, 1]`.
    fn set_water_type(&mut self, jerlov: f32);

    /// Current optical water type.
    fn water_type(&self) -> f32;

    /// Start applying ocean currents to submerged bodies.
    fn enable_currents(&mut self);

    fn disable_currents(&mut self);

    fn currents_enabled(&self) -> bool;
}
