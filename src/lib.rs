//! # `fps_locomotion`
//!
//! A first-person locomotion controller for physics-simulated bodies,
//! with physics backend abstraction.
//!
//! The controller turns player intent (movement axes, jump key,
//! sprint/crouch modifiers) into forces on a dynamic rigid body:
//! - Two downward raycasts classify ground contact and slope geometry
//! - A priority cascade selects the movement mode and its target speed
//! - A two-branch limiter clamps horizontal (or slope-tangent) speed
//!   without touching vertical velocity
//! - A jump scheduler handles the single-jump cooldown and a
//!   hold-to-repeat process with delayed activation
//! - A fixed-tick integrator applies slope-aware propulsion forces and
//!   toggles gravity on slopes
//!
//! ## Architecture
//!
//! Frame-domain systems run in `Update` (sensing, mode selection, speed
//! clamping, jump/crouch scheduling); force integration runs in
//! `FixedUpdate`. The physics world is reached only through the
//! [`backend::LocomotionPhysicsBackend`] trait; a Rapier3D backend ships
//! behind the `rapier3d` feature.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_rapier3d::prelude::*;
//! use fps_locomotion::prelude::*;
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
//!     .add_plugins(LocomotionPlugin::<Rapier3dBackend>::default())
//!     .run();
//! ```
//!
//! The input collaborator writes [`intent::LocomotionIntent`] each frame
//! and the camera collaborator keeps [`config::OrientationFrame`] up to
//! date; the controller consumes both and never polls devices itself.

use bevy::prelude::*;

pub mod backend;
pub mod config;
pub mod crouch;
pub mod intent;
pub mod jump;
pub mod limiter;
pub mod modes;
pub mod sensor;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::LocomotionPhysicsBackend;
    pub use crate::config::{LocomotionConfig, OrientationFrame};
    pub use crate::crouch::CrouchState;
    pub use crate::intent::LocomotionIntent;
    pub use crate::jump::JumpState;
    pub use crate::modes::{ModeState, MovementMode};
    pub use crate::sensor::GroundState;
    pub use crate::{ControllerDisabled, LocomotionBundle, LocomotionPlugin, LocomotionSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dLocomotionBundle};
}

/// Marker inserted when an entity's controller cannot run (no rigid
/// body). Every locomotion system skips entities carrying it.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct ControllerDisabled;

/// System sets for the locomotion controller.
///
/// The first four run in `Update` in order; `Integration` runs in
/// `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Backend raycasts refresh [`sensor::GroundState`]; body validation.
    Sensors,
    /// Movement mode selection.
    Modes,
    /// Velocity clamping.
    SpeedLimit,
    /// Jump scheduler, crouch, ground drag.
    Scheduling,
    /// Fixed-tick force integration.
    Integration,
}

/// Main plugin for the locomotion controller.
///
/// Generic over a physics backend `B` which provides the actual physics
/// operations (raycasting, force application, etc.).
pub struct LocomotionPlugin<B: backend::LocomotionPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::LocomotionPhysicsBackend> Default for LocomotionPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::LocomotionPhysicsBackend> Plugin for LocomotionPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<config::OrientationFrame>();
        app.register_type::<intent::LocomotionIntent>();
        app.register_type::<sensor::GroundState>();
        app.register_type::<modes::ModeState>();
        app.register_type::<jump::JumpState>();
        app.register_type::<crouch::CrouchState>();
        app.register_type::<ControllerDisabled>();

        // Add the physics backend plugin (sensors + validation)
        app.add_plugins(B::plugin());

        // Frame domain: sense, select mode, clamp, schedule.
        app.configure_sets(
            Update,
            (
                LocomotionSet::Sensors,
                LocomotionSet::Modes,
                LocomotionSet::SpeedLimit,
                LocomotionSet::Scheduling,
            )
                .chain(),
        );
        app.add_systems(
            Update,
            (
                systems::select_movement_mode.in_set(LocomotionSet::Modes),
                systems::limit_speed::<B>.in_set(LocomotionSet::SpeedLimit),
                (
                    systems::drive_jump_scheduler::<B>,
                    systems::apply_crouch::<B>,
                    systems::apply_ground_drag::<B>,
                )
                    .chain()
                    .in_set(LocomotionSet::Scheduling),
            ),
        );

        // Edge latching happens after every consumer has seen this frame.
        app.add_systems(PostUpdate, systems::latch_intent_edges);

        // Fixed domain: force integration.
        app.add_systems(
            FixedUpdate,
            systems::integrate_forces::<B>.in_set(LocomotionSet::Integration),
        );
    }
}

/// Controller-side components for one locomotion body.
///
/// Physics-side components (rigid body, collider, velocity, ...) come
/// from the backend, e.g. `Rapier3dLocomotionBundle` plus a `Collider`.
#[derive(Bundle, Default)]
pub struct LocomotionBundle {
    pub config: config::LocomotionConfig,
    pub intent: intent::LocomotionIntent,
    pub ground: sensor::GroundState,
    pub mode: modes::ModeState,
    pub jump: jump::JumpState,
    pub crouch: crouch::CrouchState,
}

impl LocomotionBundle {
    /// Bundle a config with freshly initialized controller state.
    pub fn new(config: config::LocomotionConfig) -> Self {
        Self {
            mode: modes::ModeState::new(&config),
            config,
            ..Default::default()
        }
    }
}
