#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cypher Town demo.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems read immutable snapshots and respond
//! exclusively with new command batches.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Banner shown on top of the scene once it is running.
pub const WELCOME_BANNER: &str = "Change your Cypher number in the URL\nArrow keys to move";

/// Character loaded when the location does not name one.
pub const DEFAULT_CHARACTER: &str = "1718";

/// Name of the query parameter that selects the active character.
pub const CHARACTER_QUERY_PARAMETER: &str = "character";

/// Player walking speed measured in pixels per second.
pub const DEFAULT_PLAYER_SPEED: f32 = 175.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the player's velocity for the upcoming ticks.
    SetPlayerVelocity {
        /// Velocity expressed in pixels per second.
        velocity: Velocity,
    },
    /// Replaces the pose the player sprite should present.
    SetPlayerPose {
        /// Pose selected for the current tick.
        pose: Pose,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the collision debug pass becomes visible.
    EnableDebugOverlay,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player's sprite centre moved.
    PlayerMoved {
        /// Position before the tick.
        from: Point,
        /// Position after collision resolution.
        to: Point,
    },
    /// Announces that the player's pose differs from the previous one.
    PlayerPoseChanged {
        /// Pose that became active.
        pose: Pose,
    },
    /// Announces that the collision debug pass became visible.
    DebugOverlayEnabled,
}

/// Identifier selecting the skin and animation set of the player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    /// Creates a new character identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new(DEFAULT_CHARACTER)
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Directional keys observed during a single tick.
///
/// Flags are independent; opposing directions may be held together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionalInput {
    /// Whether the up key is held.
    pub up: bool,
    /// Whether the down key is held.
    pub down: bool,
    /// Whether the left key is held.
    pub left: bool,
    /// Whether the right key is held.
    pub right: bool,
}

impl DirectionalInput {
    /// Input with no key held.
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Creates a new input snapshot from the four key states.
    #[must_use]
    pub const fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    /// Returns `true` when no directional key is held.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Two dimensional velocity expressed in pixels per second.
///
/// Positive `x` points right and positive `y` points down, matching screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    x: f32,
    y: f32,
}

impl Velocity {
    /// Velocity of a body at rest.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new velocity.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Returns `true` when both components are exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Rescales the vector to the provided length, keeping zero vectors unchanged.
    #[must_use]
    pub fn with_magnitude(self, length: f32) -> Self {
        let magnitude = self.magnitude();
        if magnitude <= f32::EPSILON {
            return Self::ZERO;
        }

        let factor = length / magnitude;
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Position in map pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate, growing to the right.
    pub x: f32,
    /// Vertical coordinate, growing downwards.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offsets the point by `velocity` applied over `dt`.
    #[must_use]
    pub fn advanced(self, velocity: Velocity, dt: Duration) -> Self {
        let seconds = dt.as_secs_f32();
        Self::new(self.x + velocity.x() * seconds, self.y + velocity.y() * seconds)
    }
}

/// Cardinal facing of the player sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing towards decreasing x.
    Left,
    /// Facing towards increasing x.
    Right,
    /// Facing towards decreasing y, showing the character's back.
    Up,
    /// Facing towards increasing y, showing the character's front.
    Down,
}

/// Pose the player sprite should present after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pose {
    /// Walking animation in the given direction.
    Walking(Facing),
    /// Static idle frame for the given facing.
    Idle(Facing),
    /// Animation stopped with the current texture retained.
    Unchanged,
}

/// Animation keys and idle frame names used by a character's sprite sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationNaming {
    walk_left: String,
    walk_right: String,
    walk_up: String,
    walk_down: String,
    idle_left: String,
    idle_right: String,
    idle_up: String,
    idle_down: String,
}

impl AnimationNaming {
    /// Builds the naming convention for the provided preset.
    #[must_use]
    pub fn from_preset(preset: NamingPreset) -> Self {
        let (up, down) = match preset {
            NamingPreset::Compass => ("walking north", "walking south"),
            NamingPreset::Screen => ("walking up", "walking down"),
        };

        Self {
            walk_left: "walking left".to_owned(),
            walk_right: "walking right".to_owned(),
            walk_up: up.to_owned(),
            walk_down: down.to_owned(),
            idle_left: "4".to_owned(),
            idle_right: "12".to_owned(),
            idle_up: "8".to_owned(),
            idle_down: "0".to_owned(),
        }
    }

    /// Animation key played while walking towards `facing`.
    #[must_use]
    pub fn walk_key(&self, facing: Facing) -> &str {
        match facing {
            Facing::Left => &self.walk_left,
            Facing::Right => &self.walk_right,
            Facing::Up => &self.walk_up,
            Facing::Down => &self.walk_down,
        }
    }

    /// Frame name shown while idling towards `facing`.
    #[must_use]
    pub fn idle_frame(&self, facing: Facing) -> &str {
        match facing {
            Facing::Left => &self.idle_left,
            Facing::Right => &self.idle_right,
            Facing::Up => &self.idle_up,
            Facing::Down => &self.idle_down,
        }
    }

    /// Enumerates every walking animation key in left, right, up, down order.
    #[must_use]
    pub fn walk_keys(&self) -> [&str; 4] {
        [
            self.walk_key(Facing::Left),
            self.walk_key(Facing::Right),
            self.walk_key(Facing::Up),
            self.walk_key(Facing::Down),
        ]
    }

    /// Enumerates every idle frame name in left, right, up, down order.
    #[must_use]
    pub fn idle_frames(&self) -> [&str; 4] {
        [
            self.idle_frame(Facing::Left),
            self.idle_frame(Facing::Right),
            self.idle_frame(Facing::Up),
            self.idle_frame(Facing::Down),
        ]
    }
}

impl Default for AnimationNaming {
    fn default() -> Self {
        Self::from_preset(NamingPreset::default())
    }
}

/// Known animation naming conventions shipped with character sprite sheets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPreset {
    /// Vertical walks are tagged "walking north" and "walking south".
    #[default]
    Compass,
    /// Vertical walks are tagged "walking up" and "walking down".
    Screen,
}

impl FromStr for NamingPreset {
    type Err = UnknownNamingPreset;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compass" => Ok(Self::Compass),
            "screen" => Ok(Self::Screen),
            _ => Err(UnknownNamingPreset(value.to_owned())),
        }
    }
}

/// Error returned when a naming preset cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown animation naming preset `{0}` (expected `compass` or `screen`)")]
pub struct UnknownNamingPreset(String);

/// Files a scene needs before it can be constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRequests {
    /// Tiled JSON map shared by every character.
    pub tilemap: PathBuf,
    /// Tileset texture referenced by the map.
    pub tileset_image: PathBuf,
    /// Character sprite-sheet texture.
    pub sprite_sheet: PathBuf,
    /// Aseprite JSON describing the sprite sheet.
    pub animations: PathBuf,
}

/// Text assets delivered to the scene builder once every request finished loading.
///
/// Textures stay with the rendering backend; the scene refers to them by role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedAssets {
    /// Contents of the Tiled JSON map.
    pub tilemap_json: String,
    /// Contents of the Aseprite JSON metadata.
    pub animation_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_magnitude_rescales_diagonals() {
        let velocity = Velocity::new(-3.0, 4.0).with_magnitude(10.0);

        assert!((velocity.magnitude() - 10.0).abs() < 1e-4);
        assert!((velocity.x() + 6.0).abs() < 1e-4);
        assert!((velocity.y() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn with_magnitude_keeps_zero_vector() {
        assert_eq!(Velocity::ZERO.with_magnitude(175.0), Velocity::ZERO);
    }

    #[test]
    fn point_advances_by_velocity_over_time() {
        let point = Point::new(10.0, 20.0)
            .advanced(Velocity::new(100.0, -50.0), Duration::from_millis(500));

        assert_eq!(point, Point::new(60.0, -5.0));
    }

    #[test]
    fn presets_differ_only_in_vertical_walk_keys() {
        let compass = AnimationNaming::from_preset(NamingPreset::Compass);
        let screen = AnimationNaming::from_preset(NamingPreset::Screen);

        assert_eq!(compass.walk_key(Facing::Left), screen.walk_key(Facing::Left));
        assert_eq!(compass.walk_key(Facing::Up), "walking north");
        assert_eq!(screen.walk_key(Facing::Down), "walking down");
        assert_eq!(compass.idle_frames(), ["4", "12", "8", "0"]);
        assert_eq!(compass.idle_frames(), screen.idle_frames());
    }

    #[test]
    fn naming_preset_parses_case_insensitively() {
        assert_eq!("Screen".parse::<NamingPreset>(), Ok(NamingPreset::Screen));
        assert_eq!(" compass ".parse::<NamingPreset>(), Ok(NamingPreset::Compass));
        assert!("diagonal".parse::<NamingPreset>().is_err());
    }

    #[test]
    fn unknown_preset_error_names_the_accepted_values() {
        let error = "diagonal"
            .parse::<NamingPreset>()
            .expect_err("diagonal is not a preset");
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(error.clone());

        assert_eq!(
            boxed.to_string(),
            "unknown animation naming preset `diagonal` (expected `compass` or `screen`)"
        );
        assert_eq!(error, UnknownNamingPreset("diagonal".to_owned()));
    }

    #[test]
    fn character_id_defaults_to_fixed_character() {
        assert_eq!(CharacterId::default().as_str(), DEFAULT_CHARACTER);
        assert_eq!(CharacterId::from("5309").to_string(), "5309");
    }
}
