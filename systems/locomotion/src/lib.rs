#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure locomotion system that turns held arrow keys into player motion.
//!
//! Each tick the system reads the directional keys and the velocity applied
//! during the previous tick, and answers with the new velocity and the pose the
//! sprite should present. Opposing keys never cancel: left wins over right and
//! up wins over down, both for the velocity and for the selected pose.

use cypher_town_core::{Command, DirectionalInput, Facing, Pose, Velocity, DEFAULT_PLAYER_SPEED};
use thiserror::Error;

/// Errors raised when configuring the locomotion system.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum LocomotionError {
    /// Speed must be a positive finite number of pixels per second.
    #[error("player speed must be positive and finite (received {speed})")]
    InvalidSpeed {
        /// Rejected speed.
        speed: f32,
    },
}

/// Velocity and pose produced for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Velocity the player should move with.
    pub velocity: Velocity,
    /// Pose the player sprite should present.
    pub pose: Pose,
}

/// Maps directional input and the previous velocity to the next [`Motion`].
#[must_use]
pub fn map_input(input: DirectionalInput, previous: Velocity, speed: f32) -> Motion {
    let x = if input.left {
        -speed
    } else if input.right {
        speed
    } else {
        0.0
    };
    let y = if input.up {
        -speed
    } else if input.down {
        speed
    } else {
        0.0
    };

    let mut velocity = Velocity::new(x, y);
    if x != 0.0 && y != 0.0 {
        velocity = velocity.with_magnitude(speed);
    }

    Motion {
        velocity,
        pose: select_pose(input, previous),
    }
}

fn select_pose(input: DirectionalInput, previous: Velocity) -> Pose {
    if input.left {
        Pose::Walking(Facing::Left)
    } else if input.right {
        Pose::Walking(Facing::Right)
    } else if input.up {
        Pose::Walking(Facing::Up)
    } else if input.down {
        Pose::Walking(Facing::Down)
    } else if previous.x() < 0.0 {
        Pose::Idle(Facing::Left)
    } else if previous.x() > 0.0 {
        Pose::Idle(Facing::Right)
    } else if previous.y() < 0.0 {
        Pose::Idle(Facing::Up)
    } else if previous.y() > 0.0 {
        Pose::Idle(Facing::Down)
    } else {
        Pose::Unchanged
    }
}

/// Pure system that converts per-tick input into player commands.
#[derive(Clone, Copy, Debug)]
pub struct Locomotion {
    speed: f32,
}

impl Locomotion {
    /// Creates a locomotion system that moves the player at `speed` pixels per second.
    pub fn new(speed: f32) -> Result<Self, LocomotionError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(LocomotionError::InvalidSpeed { speed });
        }

        Ok(Self { speed })
    }

    /// Configured speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Computes the motion for one tick without emitting commands.
    #[must_use]
    pub fn step(&self, input: DirectionalInput, previous: Velocity) -> Motion {
        map_input(input, previous, self.speed)
    }

    /// Emits the velocity and pose commands for one tick.
    ///
    /// `previous` is the velocity the world applied during the preceding tick.
    pub fn handle(&self, input: DirectionalInput, previous: Velocity, out: &mut Vec<Command>) {
        let Motion { velocity, pose } = self.step(input, previous);
        out.push(Command::SetPlayerVelocity { velocity });
        out.push(Command::SetPlayerPose { pose });
    }
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PLAYER_SPEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_or_non_finite_speed() {
        assert_eq!(
            Locomotion::new(0.0).unwrap_err(),
            LocomotionError::InvalidSpeed { speed: 0.0 }
        );
        assert!(Locomotion::new(-5.0).is_err());
        assert!(Locomotion::new(f32::NAN).is_err());
        assert!(Locomotion::new(f32::INFINITY).is_err());
        assert_eq!(Locomotion::new(90.0).map(|system| system.speed()), Ok(90.0));
    }

    #[test]
    fn handle_emits_velocity_then_pose() {
        let system = Locomotion::default();
        let mut commands = Vec::new();

        system.handle(
            DirectionalInput::new(false, true, false, false),
            Velocity::ZERO,
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![
                Command::SetPlayerVelocity {
                    velocity: Velocity::new(0.0, DEFAULT_PLAYER_SPEED),
                },
                Command::SetPlayerPose {
                    pose: Pose::Walking(Facing::Down),
                },
            ]
        );
    }

    #[test]
    fn horizontal_key_decides_pose_on_diagonals() {
        let motion = map_input(
            DirectionalInput::new(true, false, false, true),
            Velocity::ZERO,
            100.0,
        );

        assert_eq!(motion.pose, Pose::Walking(Facing::Right));
        assert!(motion.velocity.x() > 0.0 && motion.velocity.y() < 0.0);
    }
}
