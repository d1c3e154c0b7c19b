//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::LocomotionPhysicsBackend;
use crate::config::LocomotionConfig;
use crate::sensor::{GroundState, RayHit};
use crate::{ControllerDisabled, LocomotionSet};

/// Rapier3D physics backend for the locomotion controller.
///
/// Uses `bevy_rapier3d` for velocity, impulse, force, damping, and
/// gravity-scale access. The ground and slope raycasts run in a
/// dedicated system that receives the Rapier context as a system
/// parameter.
pub struct Rapier3dBackend;

impl LocomotionPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            // Fallback: apply as a velocity change if no ExternalImpulse
            // component (the bundle always carries one).
            vel.linvel += impulse;
        }
    }

    fn set_force(world: &mut World, entity: Entity, force: Vec3) {
        if let Some(mut ext_force) = world.get_mut::<ExternalForce>(entity) {
            ext_force.force = force;
        }
    }

    fn set_linear_damping(world: &mut World, entity: Entity, damping: f32) {
        if let Some(mut body_damping) = world.get_mut::<Damping>(entity) {
            body_damping.linear_damping = damping;
        }
    }

    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool) {
        if let Some(mut scale) = world.get_mut::<GravityScale>(entity) {
            scale.0 = if enabled { 1.0 } else { 0.0 };
        }
    }

    fn position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation())
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn mass(world: &World, entity: Entity) -> f32 {
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|mass| mass.is_finite() && *mass > 0.0)
            .unwrap_or(1.0)
    }
}

/// Plugin that sets up Rapier3D-specific systems for the controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (validate_locomotion_bodies, rapier_ground_sensor)
                .chain()
                .in_set(LocomotionSet::Sensors),
        );
    }
}

/// Physics components a Rapier-backed locomotion body needs.
///
/// Rotation is locked on all axes; the orientation collaborator steers
/// via [`crate::config::OrientationFrame`], never by rotating the body.
#[derive(Bundle)]
pub struct Rapier3dLocomotionBundle {
    pub rigid_body: RigidBody,
    pub locked_axes: LockedAxes,
    pub velocity: Velocity,
    pub damping: Damping,
    pub gravity_scale: GravityScale,
    pub external_force: ExternalForce,
    pub external_impulse: ExternalImpulse,
    pub read_mass_properties: ReadMassProperties,
}

impl Default for Rapier3dLocomotionBundle {
    fn default() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            locked_axes: LockedAxes::ROTATION_LOCKED,
            velocity: Velocity::default(),
            damping: Damping::default(),
            gravity_scale: GravityScale(1.0),
            external_force: ExternalForce::default(),
            external_impulse: ExternalImpulse::default(),
            read_mass_properties: ReadMassProperties::default(),
        }
    }
}

impl Rapier3dLocomotionBundle {
    /// A dynamic, rotation-locked body with gravity enabled.
    pub fn rotation_locked() -> Self {
        Self::default()
    }
}

/// Check newly configured bodies once and report misconfiguration.
///
/// A missing rigid body is fatal for that entity: no movement can occur
/// without one, so the controller is disabled. Everything else keeps the
/// controller running but warns loudly, since jump or gravity behavior
/// will visibly fail.
fn validate_locomotion_bodies(
    mut commands: Commands,
    q_new: Query<
        (
            Entity,
            Option<&RigidBody>,
            Option<&GravityScale>,
            Option<&LockedAxes>,
        ),
        Added<LocomotionConfig>,
    >,
) {
    for (entity, body, gravity_scale, locked_axes) in &q_new {
        match body.copied() {
            None => {
                error!(
                    "locomotion entity {entity:?} has no rigid body; disabling its controller"
                );
                commands.entity(entity).insert(ControllerDisabled);
            }
            Some(RigidBody::Dynamic) => {
                if gravity_scale.map(|scale| scale.0 == 0.0).unwrap_or(false) {
                    warn!(
                        "locomotion entity {entity:?} has gravity scale 0; \
                         jumping and falling will not behave as expected"
                    );
                }
                let rotation_locked = locked_axes
                    .map(|axes| axes.contains(LockedAxes::ROTATION_LOCKED))
                    .unwrap_or(false);
                if !rotation_locked {
                    warn!(
                        "locomotion entity {entity:?} does not lock rotation; the body may tip over"
                    );
                }
            }
            Some(_) => {
                warn!(
                    "locomotion entity {entity:?} is not a dynamic body; \
                     propulsion and jumping will not work"
                );
            }
        }
    }
}

/// Refresh every body's [`GroundState`] from two downward raycasts.
///
/// The grounded ray starts slightly above the body position (tolerating
/// pivots below the feet) and honors the configured ground filter. The
/// slope probe starts at the unmodified position, reaches slightly
/// farther, and is unfiltered. Both exclude the body itself.
fn rapier_ground_sensor(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<
        (Entity, &GlobalTransform, &LocomotionConfig, &mut GroundState),
        Without<ControllerDisabled>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut ground) in &mut q_controllers {
        let position = transform.translation();

        let ground_origin = position + Vec3::Y * config.ray_origin_offset;
        let ground_hit = cast_down(
            &context,
            ground_origin,
            config.ground_ray_length(),
            ray_filter(entity, config.ground_filter),
        );

        let slope_hit = cast_down(
            &context,
            position,
            config.slope_ray_length(),
            ray_filter(entity, None),
        );

        ground.refresh(ground_hit.as_ref(), slope_hit.as_ref());
    }
}

/// Cast a ray straight down and package the hit.
fn cast_down(
    context: &RapierContext,
    origin: Vec3,
    max_distance: f32,
    filter: QueryFilter,
) -> Option<RayHit> {
    context
        .cast_ray_and_get_normal(origin, Vec3::NEG_Y, max_distance, true, filter)
        .map(|(hit_entity, intersection)| {
            RayHit::new(
                intersection.time_of_impact,
                intersection.normal,
                intersection.point,
                Some(hit_entity),
            )
        })
}

/// Build the ray filter: exclude the casting body and sensors, and apply
/// collision group bits when provided.
fn ray_filter(exclude: Entity, groups: Option<(u32, u32)>) -> QueryFilter<'static> {
    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude)
        .exclude_sensors();

    if let Some((memberships, filters)) = groups {
        filter = filter.groups(CollisionGroups::new(
            Group::from_bits_truncate(memberships),
            Group::from_bits_truncate(filters),
        ));
    }
    filter
}
