//! Physics backend abstraction.
//!
//! This module defines the trait physics backends implement to work with
//! the locomotion controller, keeping the behavior systems independent of
//! the physics engine. The controller's only contract with the physics
//! world: read position and velocity, write velocity, apply impulses and
//! forces, and toggle damping/gravity.
//!
//! Ground and slope raycasts are *not* part of the trait: each backend
//! registers its own sensor system (which has direct access to the
//! engine's query pipeline) in [`crate::LocomotionSet::Sensors`], writing
//! [`crate::sensor::GroundState`] before the frame's behavior systems
//! run. See the `rapier` module's `Rapier3dBackend` for the reference
//! implementation.

use bevy::prelude::*;

/// Trait for physics backend implementations.
pub trait LocomotionPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend: its sensor system,
    /// its body validation, and anything else the engine needs.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Apply an instantaneous impulse (change in momentum).
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Overwrite the propulsion force for the current physics step.
    ///
    /// The integrator computes one total force per fixed tick and sets it
    /// wholesale, which also clears the previous tick's contribution.
    fn set_force(world: &mut World, entity: Entity, force: Vec3);

    /// Set the body's linear damping.
    fn set_linear_damping(world: &mut World, entity: Entity, damping: f32);

    /// Enable or disable gravity for the body.
    ///
    /// Idempotent; the integrator calls it every fixed tick with the
    /// current on-slope result.
    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool);

    /// Get the current position of an entity.
    fn position(world: &World, entity: Entity) -> Vec3;

    /// Get the mass of an entity.
    ///
    /// Used to scale impulses and forces so the config's tunables read as
    /// velocities and accelerations regardless of actual body mass.
    fn mass(_world: &World, _entity: Entity) -> f32 {
        1.0
    }
}
