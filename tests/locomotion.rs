//! Integration tests for the locomotion controller.
//!
//! These tests verify the complete system behavior with actual physics
//! simulation. Each test produces PROOF through explicit velocity/state
//! checks against a live Rapier world.

use bevy::prelude::*;
use bevy::time::Virtual;
use bevy_rapier3d::prelude::*;
use fps_locomotion::prelude::*;

/// Create a minimal test app with physics and the locomotion controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(LocomotionPlugin::<Rapier3dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static flat ground slab whose top surface is at y = 0.
fn spawn_ground(app: &mut App) -> Entity {
    let transform = Transform::from_translation(Vec3::new(0.0, -0.5, 0.0));
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(50.0, 0.5, 50.0),
        ))
        .id()
}

/// Spawn a static slab tilted by `angle_deg` around Z, centered at origin.
fn spawn_incline(app: &mut App, angle_deg: f32) -> Entity {
    let transform = Transform::from_rotation(Quat::from_rotation_z(angle_deg.to_radians()));
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(50.0, 0.5, 50.0),
        ))
        .id()
}

/// Spawn a controlled body (2-unit capsule, matching the default
/// `player_height`) at the given position.
fn spawn_character(app: &mut App, position: Vec3, config: LocomotionConfig) -> Entity {
    let transform = Transform::from_translation(position);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            LocomotionBundle::new(config),
            OrientationFrame::default(),
            Rapier3dLocomotionBundle::rotation_locked(),
            Collider::capsule_y(0.5, 0.5),
        ))
        .id()
}

/// Run one frame + physics step.
fn tick(app: &mut App) {
    let timestep = std::time::Duration::from_secs_f64(1.0 / 60.0);
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .advance_by(timestep);
    app.update();
    app.world_mut().run_schedule(bevy::prelude::FixedUpdate);
    app.update();
}

/// Run the app for N frames.
fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

fn set_intent(app: &mut App, entity: Entity, update: impl FnOnce(&mut LocomotionIntent)) {
    let mut intent = app
        .world_mut()
        .get_mut::<LocomotionIntent>(entity)
        .expect("character should have an intent");
    update(&mut intent);
}

fn velocity(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Velocity>(entity).unwrap().linvel
}

fn ground_state(app: &App, entity: Entity) -> GroundState {
    *app.world().get::<GroundState>(entity).unwrap()
}

fn mode_state(app: &App, entity: Entity) -> ModeState {
    *app.world().get::<ModeState>(entity).unwrap()
}

fn jump_state(app: &App, entity: Entity) -> JumpState {
    *app.world().get::<JumpState>(entity).unwrap()
}

/// Tick `frames` times, counting jumps by watching the last-jump stamp.
fn run_counting_jumps(app: &mut App, entity: Entity, frames: usize) -> usize {
    let mut jumps = 0;
    let mut last = jump_state(app, entity).last_jump_time;
    for _ in 0..frames {
        tick(app);
        let stamp = jump_state(app, entity).last_jump_time;
        if stamp != last {
            jumps += 1;
            last = stamp;
        }
    }
    jumps
}

// ==================== Ground Detection ====================

mod ground_detection {
    use super::*;

    #[test]
    fn character_resting_on_ground_is_grounded() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let character = spawn_character(&mut app, Vec3::Y, LocomotionConfig::default());

        run_frames(&mut app, 5);

        let ground = ground_state(&app, character);
        println!(
            "PROOF: grounded={}, slope={:?}",
            ground.grounded, ground.slope
        );
        assert!(ground.grounded, "resting character should be grounded");

        // Flat ground: the slope probe hits but reports angle zero, which
        // is excluded from slope handling.
        let slope = ground.slope.expect("slope probe should hit flat ground");
        assert!(slope.angle_deg.abs() < 0.5);
        assert!(!ground.on_slope(40.0));

        // Ground drag is applied while grounded.
        let damping = app.world().get::<Damping>(character).unwrap();
        assert_eq!(damping.linear_damping, LocomotionConfig::default().ground_drag);
    }

    #[test]
    fn character_high_above_ground_is_airborne() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let character = spawn_character(&mut app, Vec3::Y * 20.0, LocomotionConfig::default());

        tick(&mut app);

        let ground = ground_state(&app, character);
        println!(
            "PROOF: grounded={}, slope={:?}",
            ground.grounded, ground.slope
        );
        assert!(!ground.grounded);
        assert!(ground.slope.is_none());
        assert_eq!(mode_state(&app, character).mode, MovementMode::Airborne);

        // No drag while airborne.
        let damping = app.world().get::<Damping>(character).unwrap();
        assert_eq!(damping.linear_damping, 0.0);
    }

    #[test]
    fn ground_filter_only_gates_the_grounded_ray() {
        let mut app = create_test_app();

        // Ground slab lives in group 2; the grounded ray only accepts
        // group 1, so it misses. The slope probe is unfiltered.
        let ground = spawn_ground(&mut app);
        app.world_mut()
            .entity_mut(ground)
            .insert(CollisionGroups::new(Group::GROUP_2, Group::ALL));

        let config = LocomotionConfig::default().with_ground_filter(
            Group::ALL.bits(),
            Group::GROUP_1.bits(),
        );
        let character = spawn_character(&mut app, Vec3::Y, config);

        tick(&mut app);

        let ground = ground_state(&app, character);
        println!(
            "PROOF: grounded={}, slope_hit={}",
            ground.grounded,
            ground.slope.is_some()
        );
        assert!(
            !ground.grounded,
            "surface outside the ground filter must not ground the body"
        );
        assert!(
            ground.slope.is_some(),
            "the slope probe ignores the ground filter"
        );
    }
}

// ==================== Movement Modes ====================

mod movement_modes {
    use super::*;

    #[test]
    fn cascade_selects_modes_by_priority() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let config = LocomotionConfig::default();
        let character = spawn_character(&mut app, Vec3::Y, config);

        run_frames(&mut app, 5);
        let state = mode_state(&app, character);
        assert_eq!(state.mode, MovementMode::Walking);
        assert_eq!(state.target_speed, config.walk_speed);

        set_intent(&mut app, character, |i| i.set_sprint_held(true));
        tick(&mut app);
        let state = mode_state(&app, character);
        assert_eq!(state.mode, MovementMode::Sprinting);
        assert_eq!(state.target_speed, config.sprint_speed);

        // Crouch short-circuits sprint.
        set_intent(&mut app, character, |i| i.set_crouch_held(true));
        tick(&mut app);
        let state = mode_state(&app, character);
        assert_eq!(state.mode, MovementMode::Crouching);
        assert_eq!(state.target_speed, config.crouch_speed);
    }

    #[test]
    fn airborne_retains_last_grounded_speed() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let config = LocomotionConfig::default();
        let character = spawn_character(&mut app, Vec3::Y, config);

        set_intent(&mut app, character, |i| i.set_sprint_held(true));
        run_frames(&mut app, 5);
        assert_eq!(mode_state(&app, character).mode, MovementMode::Sprinting);

        // Teleport well above the ground: next frame is airborne.
        app.world_mut()
            .get_mut::<Transform>(character)
            .unwrap()
            .translation = Vec3::Y * 20.0;
        run_frames(&mut app, 2);

        let state = mode_state(&app, character);
        println!(
            "PROOF: mode={:?}, target_speed={}",
            state.mode, state.target_speed
        );
        assert_eq!(state.mode, MovementMode::Airborne);
        // The sprint speed carries over into the air.
        assert_eq!(state.target_speed, config.sprint_speed);
    }
}

// ==================== Speed Limiting ====================

mod speed_limiting {
    use super::*;

    #[test]
    fn walking_speed_approaches_but_never_exceeds_target() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let config = LocomotionConfig::default().with_speeds(5.0, 10.0, 3.5);
        let character = spawn_character(&mut app, Vec3::Y, config);

        run_frames(&mut app, 5);
        set_intent(&mut app, character, |i| i.set_move_axes(1.0, 0.0));

        let mut peak: f32 = 0.0;
        for _ in 0..120 {
            tick(&mut app);
            let v = velocity(&app, character);
            peak = peak.max(Vec2::new(v.x, v.z).length());
        }

        let v = velocity(&app, character);
        let flat_speed = Vec2::new(v.x, v.z).length();
        println!("PROOF: flat_speed={flat_speed}, peak={peak}, velocity={v:?}");

        // Propulsion is strong enough to reach the cap...
        assert!(
            flat_speed > 4.0,
            "walking should approach the target speed, got {flat_speed}"
        );
        // ...and the clamp keeps it there (small overshoot within a
        // physics step before the next frame's clamp is tolerated).
        assert!(
            peak <= 5.0 + 0.25,
            "horizontal speed must not exceed the walk speed, peaked at {peak}"
        );
        // Moving along +X (the frame's right axis with input (1, 0)).
        assert!(v.x > 0.0);

        // Resting on the ground: the clamp never manufactures vertical
        // velocity.
        assert!(v.y.abs() < 0.5, "vertical velocity disturbed: {}", v.y);
    }

    #[test]
    fn airborne_clamp_leaves_fall_speed_alone() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let character = spawn_character(&mut app, Vec3::Y * 20.0, LocomotionConfig::default());

        tick(&mut app);
        // Fast horizontally, falling.
        app.world_mut()
            .get_mut::<Velocity>(character)
            .unwrap()
            .linvel = Vec3::new(30.0, -3.0, 0.0);

        tick(&mut app);

        let v = velocity(&app, character);
        let flat_speed = Vec2::new(v.x, v.z).length();
        println!("PROOF: velocity={v:?}, flat_speed={flat_speed}");

        // Clamped to the carried-over walk speed.
        let walk_speed = LocomotionConfig::default().walk_speed;
        assert!(flat_speed <= walk_speed + 0.1);
        // Still falling, faster than before (gravity), untouched by the clamp.
        assert!(v.y < -3.0);
    }
}

// ==================== Slopes ====================

mod slopes {
    use super::*;

    #[test]
    fn walkable_incline_reports_slope_and_disables_gravity() {
        let mut app = create_test_app();
        spawn_incline(&mut app, 20.0);
        // Surface height at x=0 is 0.5 / cos(20 deg) ~= 0.53.
        let character = spawn_character(&mut app, Vec3::Y * 1.6, LocomotionConfig::default());

        run_frames(&mut app, 2);

        let ground = ground_state(&app, character);
        let slope = ground.slope.expect("slope probe should hit the incline");
        println!("PROOF: slope={slope:?}, grounded={}", ground.grounded);

        assert!((slope.angle_deg - 20.0).abs() < 1.5);
        assert!(ground.on_slope(40.0));

        // The slope force substitutes for gravity on walkable inclines.
        let gravity_scale = app.world().get::<GravityScale>(character).unwrap();
        assert_eq!(gravity_scale.0, 0.0);
    }

    #[test]
    fn steep_incline_is_not_slope_handled() {
        let mut app = create_test_app();
        spawn_incline(&mut app, 60.0);
        // Surface height at x=0 is 0.5 / cos(60 deg) = 1.0.
        let character = spawn_character(&mut app, Vec3::Y * 2.2, LocomotionConfig::default());

        tick(&mut app);

        let ground = ground_state(&app, character);
        let slope = ground.slope.expect("slope probe should hit the incline");
        println!("PROOF: slope={slope:?}");

        assert!((slope.angle_deg - 60.0).abs() < 1.5);
        // Beyond max_slope_angle: the ordinary path applies, gravity on.
        assert!(!ground.on_slope(40.0));
        let gravity_scale = app.world().get::<GravityScale>(character).unwrap();
        assert_eq!(gravity_scale.0, 1.0);
    }
}

// ==================== Jumping ====================

mod jumping {
    use super::*;

    #[test]
    fn jump_sets_takeoff_velocity() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let config = LocomotionConfig::default().with_jump(8.0, 0.3);
        let character = spawn_character(&mut app, Vec3::Y, config);

        run_frames(&mut app, 10);
        assert!(ground_state(&app, character).grounded);

        set_intent(&mut app, character, |i| i.set_jump_held(true));
        tick(&mut app);

        let v = velocity(&app, character);
        println!("PROOF: velocity after jump = {v:?}");
        // Mass-scaled impulse: takeoff velocity ~= jump_force, minus one
        // step of gravity and ground drag.
        assert!(
            v.y > 6.0 && v.y < 8.5,
            "takeoff velocity should be close to jump_force, got {}",
            v.y
        );
        assert!(!jump_state(&app, character).ready_to_jump);
        assert!(jump_state(&app, character).exiting_slope);
    }

    #[test]
    fn cooldown_gates_repeated_presses() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        // Tiny jump force: the body never leaves the grounded ray's
        // reach, so only the cooldown gates the presses.
        let config = LocomotionConfig::default().with_jump(1.0, 0.3);
        let character = spawn_character(&mut app, Vec3::Y, config);

        run_frames(&mut app, 10);

        // First press jumps.
        set_intent(&mut app, character, |i| i.set_jump_held(true));
        tick(&mut app);
        let first_stamp = jump_state(&app, character).last_jump_time;
        set_intent(&mut app, character, |i| i.set_jump_held(false));

        // Re-press ~0.1 s later: inside the cooldown, no jump.
        run_frames(&mut app, 5);
        set_intent(&mut app, character, |i| i.set_jump_held(true));
        tick(&mut app);
        assert_eq!(
            jump_state(&app, character).last_jump_time,
            first_stamp,
            "press inside the cooldown must not jump"
        );
        set_intent(&mut app, character, |i| i.set_jump_held(false));

        // Wait out the rest of the cooldown, then press again.
        run_frames(&mut app, 20);
        assert!(jump_state(&app, character).ready_to_jump);
        set_intent(&mut app, character, |i| i.set_jump_held(true));
        tick(&mut app);
        let second_stamp = jump_state(&app, character).last_jump_time;
        println!("PROOF: first jump at {first_stamp}, second at {second_stamp}");
        assert!(second_stamp > first_stamp, "press after the cooldown jumps");
    }

    #[test]
    fn holding_auto_jumps_after_extended_delay() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let config = LocomotionConfig::default()
            .with_jump(1.0, 0.4)
            .with_hold_jump(0.5, 0.05, 0.5);
        let character = spawn_character(&mut app, Vec3::Y, config);

        run_frames(&mut app, 10);

        // Pressing jumps immediately AND starts the hold process. Because
        // the press lands right after its own jump, the initial delay is
        // extended: 0.5 + 0.5 = 1.0 s until the first auto-jump.
        set_intent(&mut app, character, |i| i.set_jump_held(true));
        let jumps = run_counting_jumps(&mut app, character, 1);
        assert_eq!(jumps, 1, "fresh press should jump immediately");

        // 0.8 s in: still inside the extended delay, no auto-jump yet.
        let jumps = run_counting_jumps(&mut app, character, 48);
        assert_eq!(jumps, 0, "no auto-jump before the extended delay");

        // Crossing the 1.0 s boundary fires exactly one auto-jump; the
        // next one cannot come before the 0.4 s cooldown.
        let jumps = run_counting_jumps(&mut app, character, 24);
        println!("PROOF: jumps around the delay boundary = {jumps}");
        assert_eq!(jumps, 1, "exactly one auto-jump at the delay boundary");
    }

    #[test]
    fn releasing_cancels_pending_auto_jumps() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let config = LocomotionConfig::default()
            .with_jump(1.0, 0.25)
            .with_hold_jump(0.5, 0.05, 0.5);
        let character = spawn_character(&mut app, Vec3::Y, config);

        run_frames(&mut app, 10);

        set_intent(&mut app, character, |i| i.set_jump_held(true));
        let jumps = run_counting_jumps(&mut app, character, 18);
        assert_eq!(jumps, 1, "only the immediate jump so far");

        // Release mid-delay; nothing may fire afterwards.
        set_intent(&mut app, character, |i| i.set_jump_held(false));
        let jumps = run_counting_jumps(&mut app, character, 180);
        println!("PROOF: jumps after release = {jumps}");
        assert_eq!(jumps, 0, "release must cancel all pending auto-jumps");
    }
}

// ==================== Crouching ====================

mod crouching {
    use super::*;

    #[test]
    fn crouch_cycles_restore_exact_scale() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let character = spawn_character(&mut app, Vec3::Y, LocomotionConfig::default());

        run_frames(&mut app, 5);
        let start_scale = app.world().get::<Transform>(character).unwrap().scale.y;

        for cycle in 0..3 {
            set_intent(&mut app, character, |i| i.set_crouch_held(true));
            tick(&mut app);
            let scale = app.world().get::<Transform>(character).unwrap().scale.y;
            assert_eq!(scale, 0.5, "crouched scale wrong on cycle {cycle}");
            assert_eq!(mode_state(&app, character).mode, MovementMode::Crouching);

            set_intent(&mut app, character, |i| i.set_crouch_held(false));
            tick(&mut app);
            let scale = app.world().get::<Transform>(character).unwrap().scale.y;
            println!("PROOF: cycle {cycle} restored scale {scale}");
            assert_eq!(
                scale, start_scale,
                "release must restore the exact pre-crouch scale"
            );
        }
    }
}

// ==================== Error Handling ====================

mod error_handling {
    use super::*;

    #[test]
    fn missing_rigid_body_disables_controller() {
        let mut app = create_test_app();
        spawn_ground(&mut app);

        // Controller components but no physics body at all.
        let transform = Transform::from_translation(Vec3::Y);
        let character = app
            .world_mut()
            .spawn((
                transform,
                GlobalTransform::from(transform),
                LocomotionBundle::new(LocomotionConfig::default()),
            ))
            .id();

        run_frames(&mut app, 2);

        let disabled = app.world().get::<ControllerDisabled>(character).is_some();
        println!("PROOF: ControllerDisabled present = {disabled}");
        assert!(disabled, "a body-less controller must be disabled");

        // The disabled entity's state is never updated.
        assert!(!ground_state(&app, character).grounded);
    }

    #[test]
    fn non_dynamic_body_keeps_running_with_warning() {
        let mut app = create_test_app();
        spawn_ground(&mut app);
        let character = spawn_character(&mut app, Vec3::Y, LocomotionConfig::default());
        // Misconfigure: fixed body. Validation warns but keeps going.
        app.world_mut()
            .entity_mut(character)
            .insert(RigidBody::Fixed);

        run_frames(&mut app, 3);

        assert!(
            app.world().get::<ControllerDisabled>(character).is_none(),
            "misconfiguration is loud but not fatal"
        );
        // Sensing still works.
        assert!(ground_state(&app, character).grounded);
    }
}
