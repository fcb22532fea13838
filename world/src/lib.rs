#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene state for Cypher Town.

pub mod animation;
pub mod collision;
pub mod tilemap;

use cypher_town_core::{Command, Event, Point, Pose, Velocity, WELCOME_BANNER};

pub use collision::{Aabb, CollisionGrid, MoveOutcome, TileFaces};
pub use animation::{
    AnimationError, AnimationLibrary, AnimationPlayer, PoseRequest, SpriteFrame,
};
pub use tilemap::{MapLayer, MapObject, PixelRect, TileLayer, TileMap, TileMapError, Tileset};

/// Physics body of the player relative to the top-left corner of its displayed frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyShape {
    /// Horizontal offset from the frame's left edge, in display pixels.
    pub offset_x: f32,
    /// Vertical offset from the frame's top edge, in display pixels.
    pub offset_y: f32,
    /// Body width in display pixels.
    pub width: f32,
    /// Body height in display pixels.
    pub height: f32,
}

impl BodyShape {
    /// Builds a body from frame-space geometry scaled by the sprite's display scale.
    #[must_use]
    pub fn scaled(offset: (f32, f32), size: (f32, f32), scale: f32) -> Self {
        Self {
            offset_x: offset.0 * scale,
            offset_y: offset.1 * scale,
            width: size.0 * scale,
            height: size.1 * scale,
        }
    }
}

/// Everything needed to place the player when the scene is constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSetup {
    /// Initial sprite centre in map pixels.
    pub position: Point,
    /// Displayed frame size in pixels as `(width, height)`.
    pub display_size: (f32, f32),
    /// Physics body relative to the displayed frame.
    pub body: BodyShape,
}

#[derive(Clone, Debug)]
struct Player {
    position: Point,
    velocity: Velocity,
    pose: Pose,
    display_size: (f32, f32),
    body: BodyShape,
}

impl Player {
    fn from_setup(setup: PlayerSetup) -> Self {
        Self {
            position: setup.position,
            velocity: Velocity::ZERO,
            pose: Pose::Unchanged,
            display_size: setup.display_size,
            body: setup.body,
        }
    }

    fn body_aabb(&self) -> Aabb {
        let left = self.position.x - self.display_size.0 * 0.5;
        let top = self.position.y - self.display_size.1 * 0.5;
        Aabb::new(
            left + self.body.offset_x,
            top + self.body.offset_y,
            self.body.width,
            self.body.height,
        )
    }
}

/// Represents the authoritative Cypher Town scene state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    map: TileMap,
    collision: CollisionGrid,
    player: Player,
    debug_overlay: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world from a decoded map, its collision grid and the player placement.
    #[must_use]
    pub fn new(map: TileMap, collision: CollisionGrid, player: PlayerSetup) -> Self {
        Self {
            banner: WELCOME_BANNER,
            map,
            collision,
            player: Player::from_setup(player),
            debug_overlay: false,
            tick_index: 0,
        }
    }

    fn advance_player(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        let velocity = self.player.velocity;
        if velocity.is_zero() {
            return;
        }

        let from = self.player.position;
        let target = from.advanced(velocity, dt);
        let body = self.player.body_aabb();
        let outcome = self
            .collision
            .move_and_slide(body, target.x - from.x, target.y - from.y);
        let to = Point::new(
            from.x + (outcome.aabb.x - body.x),
            from.y + (outcome.aabb.y - body.y),
        );

        if to != from {
            self.player.position = to;
            out_events.push(Event::PlayerMoved { from, to });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetPlayerVelocity { velocity } => {
            world.player.velocity = velocity;
        }
        Command::SetPlayerPose { pose } => {
            if world.player.pose != pose {
                world.player.pose = pose;
                out_events.push(Event::PlayerPoseChanged { pose });
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_player(dt, out_events);
        }
        Command::EnableDebugOverlay => {
            if !world.debug_overlay {
                world.debug_overlay = true;
                out_events.push(Event::DebugOverlayEnabled);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Aabb, CollisionGrid, TileMap, World};
    use cypher_town_core::{Point, Pose, Velocity};

    /// Read-only snapshot of the player entity.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Sprite centre in map pixels.
        pub position: Point,
        /// Velocity applied during the most recent tick.
        pub velocity: Velocity,
        /// Pose selected during the most recent tick.
        pub pose: Pose,
        /// Physics body in map pixels.
        pub body: Aabb,
    }

    /// Retrieves the banner adapters display over the scene.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the decoded tile map.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.map
    }

    /// Provides read-only access to the collision grid of the world layer.
    #[must_use]
    pub fn collision_grid(world: &World) -> &CollisionGrid {
        &world.collision
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            velocity: world.player.velocity,
            pose: world.player.pose,
            body: world.player.body_aabb(),
        }
    }

    /// Velocity the player moved with during the previous tick.
    #[must_use]
    pub fn player_velocity(world: &World) -> Velocity {
        world.player.velocity
    }

    /// Size of the map in pixels as `(width, height)`, used to bound the camera.
    #[must_use]
    pub fn map_bounds(world: &World) -> (f32, f32) {
        (world.map.width_in_pixels(), world.map.height_in_pixels())
    }

    /// Reports whether the collision debug pass is visible.
    #[must_use]
    pub fn debug_overlay_enabled(world: &World) -> bool {
        world.debug_overlay
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
