//! Core controller systems.
//!
//! Frame-domain systems (in `Update`) sample the intent, drive the mode
//! state machine, clamp speed, and run the jump/crouch schedulers. The
//! force integrator (in `FixedUpdate`) turns the latest frame state into
//! forces on the body. Everything that touches the physics world is
//! generic over the backend.

use bevy::prelude::*;

use crate::backend::LocomotionPhysicsBackend;
use crate::config::{LocomotionConfig, OrientationFrame};
use crate::crouch::CrouchState;
use crate::intent::LocomotionIntent;
use crate::jump::JumpState;
use crate::limiter::limit_velocity;
use crate::modes::{select_mode, ModeState};
use crate::sensor::GroundState;
use crate::ControllerDisabled;

/// Re-derive the movement mode from this frame's intent and ground
/// snapshot.
pub fn select_movement_mode(
    mut q_controllers: Query<
        (
            &LocomotionIntent,
            &GroundState,
            &LocomotionConfig,
            &mut ModeState,
        ),
        Without<ControllerDisabled>,
    >,
) {
    for (intent, ground, config, mut state) in &mut q_controllers {
        let (mode, target_speed) = select_mode(intent, ground, config);
        state.apply(mode, target_speed);
    }
}

/// Clamp each body's speed to its mode's target.
///
/// The slope branch applies only while grounded on a walkable slope and
/// outside the exiting-slope window; everything else clamps on the XZ
/// plane. Vertical velocity is never modified, and bodies already within
/// the target are not written back at all.
pub fn limit_speed<B: LocomotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32, Option<Vec3>)> = world
        .query_filtered::<(
            Entity,
            &LocomotionConfig,
            &GroundState,
            &ModeState,
            &JumpState,
        ), Without<ControllerDisabled>>()
        .iter(world)
        .map(|(entity, config, ground, mode, jump)| {
            (
                entity,
                mode.target_speed,
                ground.clamp_plane(config.max_slope_angle, jump.exiting_slope),
            )
        })
        .collect();

    for (entity, target_speed, slope_normal) in entities {
        let velocity = B::velocity(world, entity);
        if let Some(limited) = limit_velocity(velocity, target_speed, slope_normal) {
            B::set_velocity(world, entity, limited);
        }
    }
}

/// Apply ground drag: full damping while grounded, none while airborne.
pub fn apply_ground_drag<B: LocomotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32)> = world
        .query_filtered::<(Entity, &LocomotionConfig, &GroundState), Without<ControllerDisabled>>()
        .iter(world)
        .map(|(entity, config, ground)| {
            (entity, if ground.grounded { config.ground_drag } else { 0.0 })
        })
        .collect();

    for (entity, damping) in entities {
        B::set_linear_damping(world, entity, damping);
    }
}

/// Drive the jump scheduler for one frame.
///
/// Order matters and mirrors the scheduler's contract: the cooldown
/// reset is serviced first so a press in the same frame can use it; an
/// immediate jump on a fresh press is recorded *before* the hold process
/// starts, so the hold's initial delay sees the updated last-jump time;
/// release cancels the hold before its next action; finally the hold
/// machine ticks and may fire an automatic jump.
pub fn drive_jump_scheduler<B: LocomotionPhysicsBackend>(world: &mut World) {
    let (now, dt) = {
        let time = world.resource::<Time>();
        (time.elapsed_secs(), time.delta_secs())
    };

    let entities: Vec<(Entity, LocomotionConfig, bool, bool, bool)> = world
        .query_filtered::<(
            Entity,
            &LocomotionConfig,
            &LocomotionIntent,
            &GroundState,
            &JumpState,
        ), Without<ControllerDisabled>>()
        .iter(world)
        .map(|(entity, config, intent, ground, _)| {
            (
                entity,
                *config,
                ground.grounded,
                intent.jump_just_pressed(),
                intent.jump_just_released(),
            )
        })
        .collect();

    for (entity, config, grounded, pressed, released) in entities {
        let fire_now = {
            let Some(mut jump) = world.get_mut::<JumpState>(entity) else {
                continue;
            };
            jump.service_reset(now);
            pressed && jump.can_jump(grounded)
        };
        if fire_now {
            perform_jump::<B>(world, entity, &config, now);
        }

        let fire_auto = {
            let Some(mut jump) = world.get_mut::<JumpState>(entity) else {
                continue;
            };
            if pressed {
                jump.press(
                    now,
                    config.continuous_jump_delay,
                    config.hold_jump_extra_delay,
                    config.just_jumped_threshold,
                );
            }
            if released {
                jump.release();
            }
            jump.tick_hold(dt, grounded, config.hold_repeat_interval())
        };
        if fire_auto {
            perform_jump::<B>(world, entity, &config, now);
        }
    }
}

/// The single-jump sequence: record the jump (cooldown, exiting-slope
/// window, timestamp), zero the vertical velocity, apply the upward
/// impulse scaled by body mass.
fn perform_jump<B: LocomotionPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    config: &LocomotionConfig,
    now: f32,
) {
    if let Some(mut jump) = world.get_mut::<JumpState>(entity) {
        jump.record_jump(now, config.jump_cooldown);
    }

    let velocity = B::velocity(world, entity);
    B::set_velocity(world, entity, Vec3::new(velocity.x, 0.0, velocity.z));

    let mass = B::mass(world, entity);
    B::apply_impulse(world, entity, Vec3::Y * config.jump_force * mass);
}

/// Apply crouch presses and releases.
///
/// Pressing rescales the body to the crouch scale and applies a fixed
/// downward impulse for ground adhesion; releasing restores the exact
/// recorded scale. Both are unconditional, with no grounded check.
pub fn apply_crouch<B: LocomotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, LocomotionConfig, bool, bool)> = world
        .query_filtered::<(
            Entity,
            &LocomotionConfig,
            &LocomotionIntent,
            &CrouchState,
        ), Without<ControllerDisabled>>()
        .iter(world)
        .map(|(entity, config, intent, _)| {
            (
                entity,
                *config,
                intent.crouch_just_pressed(),
                intent.crouch_just_released(),
            )
        })
        .collect();

    for (entity, config, pressed, released) in entities {
        if pressed {
            let Some(current_scale) = world.get::<Transform>(entity).map(|t| t.scale.y) else {
                continue;
            };
            let crouch_scale = world
                .get_mut::<CrouchState>(entity)
                .and_then(|mut crouch| crouch.begin(current_scale, config.crouch_y_scale));
            if let Some(scale) = crouch_scale {
                if let Some(mut transform) = world.get_mut::<Transform>(entity) {
                    transform.scale.y = scale;
                }
                let mass = B::mass(world, entity);
                B::apply_impulse(world, entity, Vec3::NEG_Y * config.crouch_impulse * mass);
            }
        }

        if released {
            let restore = world
                .get_mut::<CrouchState>(entity)
                .and_then(|mut crouch| crouch.end());
            if let Some(scale) = restore {
                if let Some(mut transform) = world.get_mut::<Transform>(entity) {
                    transform.scale.y = scale;
                }
            }
        }
    }
}

/// Latch input key states for next frame's edge detection. Runs after
/// every system that consumes edges.
pub fn latch_intent_edges(mut q_intents: Query<&mut LocomotionIntent>) {
    for mut intent in &mut q_intents {
        intent.latch_edges();
    }
}

/// Fixed-tick force integrator.
///
/// Computes the move direction from the orientation frame (falling back
/// to the body's own basis with a warning), applies slope-projected and
/// planar propulsion, keeps the body pressed onto slopes while ascending,
/// and substitutes the slope force for gravity while on a slope.
pub fn integrate_forces<B: LocomotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<(
        Entity,
        LocomotionConfig,
        LocomotionIntent,
        GroundState,
        f32,
        bool,
        Option<OrientationFrame>,
    )> = world
        .query_filtered::<(
            Entity,
            &LocomotionConfig,
            &LocomotionIntent,
            &GroundState,
            &ModeState,
            &JumpState,
            Option<&OrientationFrame>,
        ), Without<ControllerDisabled>>()
        .iter(world)
        .map(|(entity, config, intent, ground, mode, jump, frame)| {
            (
                entity,
                *config,
                *intent,
                *ground,
                mode.target_speed,
                jump.exiting_slope,
                frame.copied(),
            )
        })
        .collect();

    for (entity, config, intent, ground, target_speed, exiting_slope, frame) in entities {
        let frame = frame.unwrap_or_else(|| {
            warn_once!(
                "no OrientationFrame on locomotion body; falling back to the body's own basis"
            );
            world
                .get::<Transform>(entity)
                .map(|t| OrientationFrame::new(*t.forward(), *t.right()))
                .unwrap_or_default()
        });

        let move_direction = frame.move_direction(intent.horizontal, intent.vertical);
        let propulsion = target_speed * config.propulsion_multiplier;
        let mut force = Vec3::ZERO;

        if let Some(normal) = ground.propulsion_plane(config.max_slope_angle, exiting_slope) {
            // Propel along the slope surface instead of the raw input plane.
            let slope_direction = move_direction.reject_from_normalized(normal).normalize_or_zero();
            force += slope_direction * propulsion;

            // Moving up away from the surface: push back onto it.
            if B::velocity(world, entity).y > 0.0 {
                force += Vec3::NEG_Y * config.slope_stick_force;
            }
        }

        let planar = move_direction.normalize_or_zero() * propulsion;
        force += if ground.grounded {
            planar
        } else {
            planar * config.air_multiplier
        };

        let mass = B::mass(world, entity);
        B::set_force(world, entity, force * mass);

        // The slope force substitutes for gravity while the slope probe
        // reports a walkable surface; this keys on the raw probe, not on
        // the exiting-slope window.
        B::set_gravity_enabled(world, entity, !ground.on_slope(config.max_slope_angle));
    }
}
