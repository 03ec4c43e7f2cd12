//! Simulation entities and the rigid-body motion capability.
//!
//! Whether an entity moves is answered by [`Entity::motion`], which returns
//! the [`MovingEntity`] view of the entity when it has one.  Callers never
//! downcast.

use nalgebra::Isometry3;

/// Index of an entity inside the simulation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// Anything the engine can place in the scene and the user can select.
pub trait Entity {
    /// Unique entity name within the scenario.
    fn name(&self) -> &str;

    /// The rigid-body motion capability, when this entity has one.
    fn motion(&self) -> Option<&dyn MovingEntity> {
        None
    }

    /// Mutable view of [`Entity::motion`].
    fn motion_mut(&mut self) -> Option<&mut dyn MovingEntity> {
        None
    }
}

/// Entities whose pose is integrated over time.
pub trait MovingEntity {
    /// World transform of the centre of gravity.
    fn cg_transform(&self) -> Isometry3<f64>;

    /// Teleport the body to `origin` and clear its velocities.
    fn respawn(&mut self, origin: Isometry3<f64>);
}
