//! Ground and slope sensing results.
//!
//! These structures hold the results of the two downward raycasts the
//! backend performs each frame: one grounded check against the ground
//! classification filter, and one unfiltered slope probe. Everything here
//! is a per-frame snapshot, recomputed from scratch; a ray miss is the
//! normal airborne signal, never an error.

use bevy::prelude::*;

/// Result of a single raycast against the physics world.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// Hit point in world space.
    pub point: Vec3,
    /// Entity that was hit (if known).
    pub entity: Option<Entity>,
}

impl RayHit {
    /// Create a hit result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// Surface data from the slope probe.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SlopeContact {
    /// Surface normal of the contact.
    pub normal: Vec3,
    /// Angle between world up and the normal, in degrees.
    pub angle_deg: f32,
}

impl SlopeContact {
    /// Derive the contact from a surface normal.
    pub fn from_normal(normal: Vec3) -> Self {
        let angle_deg = Vec3::Y.angle_between(normal).to_degrees();
        Self { normal, angle_deg }
    }
}

/// Per-frame ground state for one controlled body.
///
/// Written by the backend's sensor system at the start of every frame and
/// read by the mode state machine, the velocity limiter, and the force
/// integrator during the same frame. Never persisted across frames.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct GroundState {
    /// Whether the grounded ray hit a ground-classified surface.
    pub grounded: bool,
    /// Surface data from the slope probe, if it hit anything.
    pub slope: Option<SlopeContact>,
}

impl GroundState {
    /// Rebuild the snapshot from this frame's ray results.
    pub fn refresh(&mut self, ground_hit: Option<&RayHit>, slope_hit: Option<&RayHit>) {
        self.grounded = ground_hit.is_some();
        self.slope = slope_hit.map(|hit| SlopeContact::from_normal(hit.normal));
    }

    /// Whether the body stands on a walkable slope.
    ///
    /// True iff the slope probe hit and `0 < angle < max_slope_angle`.
    /// Exactly-flat ground (angle 0) is deliberately excluded: flat ground
    /// takes the ordinary ground path, not the slope path.
    pub fn on_slope(&self, max_slope_angle: f32) -> bool {
        self.slope
            .map(|s| s.angle_deg != 0.0 && s.angle_deg < max_slope_angle)
            .unwrap_or(false)
    }

    /// Slope normal to clamp against, if the slope branch applies.
    ///
    /// The slope branch of the limiter requires standing on a walkable
    /// slope, being grounded, and not being in the exiting-slope window
    /// of a jump.
    pub fn clamp_plane(&self, max_slope_angle: f32, exiting_slope: bool) -> Option<Vec3> {
        if self.grounded && !exiting_slope && self.on_slope(max_slope_angle) {
            self.slope.map(|s| s.normal)
        } else {
            None
        }
    }

    /// Slope normal for propulsion, if the slope branch applies.
    ///
    /// Unlike [`Self::clamp_plane`] this does not require the grounded
    /// ray: the slope probe reaches slightly farther than the grounded
    /// check, so propulsion keeps following the surface across the small
    /// gap where the ground ray already misses.
    pub fn propulsion_plane(&self, max_slope_angle: f32, exiting_slope: bool) -> Option<Vec3> {
        if !exiting_slope && self.on_slope(max_slope_angle) {
            self.slope.map(|s| s.normal)
        } else {
            None
        }
    }
}
