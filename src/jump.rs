//! Jump scheduling.
//!
//! Two cooperating pieces of bookkeeping live here. The single-jump path:
//! a jump fires only while `ready_to_jump && grounded`, flips
//! `ready_to_jump` off, and schedules a one-shot reset `jump_cooldown`
//! seconds later. The hold path: while the jump key stays down, an
//! explicit state machine waits out an initial delay, then arms a jump
//! whenever eligibility returns, then waits at least the cooldown before
//! re-arming. Both paths are clock-free: callers feed in `now` and `dt`
//! from the frame scheduler, which keeps every timing property unit
//! testable.

use bevy::prelude::*;

/// Phase of the hold-to-repeat process.
///
/// `Idle` means no process is active. A key press while `Idle` starts
/// `InitialDelay`; a release in any phase returns to `Idle` with no side
/// effects before the next scheduled action.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub enum HoldPhase {
    /// No hold process active.
    #[default]
    Idle,
    /// Waiting out the initial delay before auto-repeat begins.
    InitialDelay {
        /// Seconds left before auto-repeat arms.
        remaining: f32,
    },
    /// Delay elapsed; waiting for `ready_to_jump && grounded`.
    WaitingForEligibility,
    /// Jumped; waiting out `max(jump_cooldown, continuous_jump_interval)`
    /// before checking eligibility again.
    RepeatWait {
        /// Seconds left in the post-jump wait.
        remaining: f32,
    },
}

/// One-shot reset scheduled `jump_cooldown` after a jump.
///
/// Keyed by the monotonic frame clock and stamped with the generation
/// current at scheduling time, so invalidating the state (controller
/// restart) strands any reset still in flight.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct PendingReset {
    /// Clock time at which the reset fires.
    pub due: f32,
    /// Generation the reset belongs to.
    pub generation: u32,
}

/// Persistent jump bookkeeping for one controlled body.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct JumpState {
    /// Whether a jump may fire. Off from the moment of a jump until the
    /// cooldown reset fires.
    pub ready_to_jump: bool,
    /// Suppresses slope-adhesion forces between a jump impulse and its
    /// cooldown reset, so they cannot fight the ascent.
    pub exiting_slope: bool,
    /// Clock time of the most recent jump.
    pub last_jump_time: f32,
    hold: HoldPhase,
    pending_reset: Option<PendingReset>,
    generation: u32,
}

impl Default for JumpState {
    fn default() -> Self {
        Self {
            ready_to_jump: true,
            exiting_slope: false,
            last_jump_time: f32::NEG_INFINITY,
            hold: HoldPhase::Idle,
            pending_reset: None,
            generation: 0,
        }
    }
}

impl JumpState {
    /// Create a fresh state, ready to jump immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase of the hold process.
    pub fn hold_phase(&self) -> HoldPhase {
        self.hold
    }

    /// Whether a hold process is active.
    pub fn hold_active(&self) -> bool {
        self.hold != HoldPhase::Idle
    }

    /// Whether a jump may fire right now.
    pub fn can_jump(&self, grounded: bool) -> bool {
        self.ready_to_jump && grounded
    }

    /// Record that a jump fired at `now`.
    ///
    /// Clears `ready_to_jump`, opens the exiting-slope window, and
    /// schedules the one-shot reset at `now + jump_cooldown`.
    pub fn record_jump(&mut self, now: f32, jump_cooldown: f32) {
        self.ready_to_jump = false;
        self.exiting_slope = true;
        self.last_jump_time = now;
        self.pending_reset = Some(PendingReset {
            due: now + jump_cooldown,
            generation: self.generation,
        });
    }

    /// Fire the cooldown reset if it is due. Called once per frame,
    /// before input edges are processed.
    ///
    /// The reset fires independently of the hold process; a cancelled
    /// hold never cancels it. A reset from a previous generation is
    /// discarded without firing.
    pub fn service_reset(&mut self, now: f32) {
        let Some(pending) = self.pending_reset else {
            return;
        };
        if pending.generation != self.generation {
            self.pending_reset = None;
            return;
        }
        if now >= pending.due {
            self.ready_to_jump = true;
            self.exiting_slope = false;
            self.pending_reset = None;
        }
    }

    /// Invalidate in-flight timers on a controller restart.
    ///
    /// Bumps the generation so a stale reset cannot fire, cancels the
    /// hold process, and makes the state jump-ready again.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending_reset = None;
        self.hold = HoldPhase::Idle;
        self.ready_to_jump = true;
        self.exiting_slope = false;
    }

    /// Begin a hold process on a key press at `now`.
    ///
    /// Call after the press's immediate jump (if any) has been recorded:
    /// the initial delay is extended by `extra_delay` when the press lands
    /// within `just_jumped_threshold` of the last jump, and a press that
    /// itself jumped counts as such. Re-pressing while a process is
    /// active does not spawn a second one.
    pub fn press(
        &mut self,
        now: f32,
        initial_delay: f32,
        extra_delay: f32,
        just_jumped_threshold: f32,
    ) {
        if self.hold != HoldPhase::Idle {
            return;
        }
        let mut delay = initial_delay;
        if now - self.last_jump_time <= just_jumped_threshold {
            delay += extra_delay;
        }
        self.hold = HoldPhase::InitialDelay { remaining: delay };
    }

    /// Cancel the hold process on key release.
    ///
    /// Takes effect immediately: no jump fires after this, even if a wait
    /// was in progress. The pending cooldown reset is unaffected.
    pub fn release(&mut self) {
        self.hold = HoldPhase::Idle;
    }

    /// Advance the hold process by one frame.
    ///
    /// Returns `true` when an automatic jump should fire this frame; the
    /// caller then performs the jump sequence (which calls
    /// [`Self::record_jump`]). A jump is only armed the instant
    /// `ready_to_jump && grounded` holds, and consecutive automatic jumps
    /// are separated by at least `repeat_interval`.
    pub fn tick_hold(&mut self, dt: f32, grounded: bool, repeat_interval: f32) -> bool {
        match self.hold {
            HoldPhase::Idle => false,
            HoldPhase::InitialDelay { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.hold = HoldPhase::InitialDelay { remaining };
                    false
                } else {
                    self.hold = HoldPhase::WaitingForEligibility;
                    self.try_arm(grounded, repeat_interval)
                }
            }
            HoldPhase::WaitingForEligibility => self.try_arm(grounded, repeat_interval),
            HoldPhase::RepeatWait { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.hold = HoldPhase::RepeatWait { remaining };
                    false
                } else {
                    self.hold = HoldPhase::WaitingForEligibility;
                    self.try_arm(grounded, repeat_interval)
                }
            }
        }
    }

    fn try_arm(&mut self, grounded: bool, repeat_interval: f32) -> bool {
        if self.ready_to_jump && grounded {
            self.hold = HoldPhase::RepeatWait {
                remaining: repeat_interval,
            };
            true
        } else {
            false
        }
    }
}
