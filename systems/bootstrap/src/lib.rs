#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that assembles a Cypher Town scene from loaded assets.

pub mod manifest;

use cypher_town_core::{AnimationNaming, LoadedAssets, Point};
use cypher_town_world::{
    query, AnimationError, AnimationLibrary, BodyShape, CollisionGrid, PlayerSetup, TileMap,
    TileMapError, World,
};
use thiserror::Error;

pub use manifest::{
    AssetTemplates, CharacterEntry, GameSettings, Manifest, ManifestError, MapSettings,
    PlayerSettings,
};

/// Errors that abort scene construction.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The tile map could not be decoded.
    #[error("failed to decode tile map")]
    Map(#[from] TileMapError),
    /// The sprite-sheet metadata could not be decoded.
    #[error("failed to decode character animations")]
    Animation(#[from] AnimationError),
    /// The map does not embed the configured tileset.
    #[error("tile map has no tileset named `{name}`")]
    MissingTileset {
        /// Configured tileset name.
        name: String,
    },
    /// The map lacks one of the configured tile layers.
    #[error("tile map has no tile layer named `{name}`")]
    MissingLayer {
        /// Configured layer name.
        name: String,
    },
    /// The object layer does not contain the spawn point.
    #[error("object layer `{layer}` has no object named `{name}`")]
    MissingSpawnPoint {
        /// Object layer searched.
        layer: String,
        /// Spawn point name searched for.
        name: String,
    },
    /// The sprite sheet lacks a walking animation required by the naming convention.
    #[error("sprite sheet has no animation named `{key}`")]
    MissingAnimation {
        /// Missing animation key.
        key: String,
    },
    /// The sprite sheet lacks an idle frame required by the naming convention.
    #[error("sprite sheet has no frame named `{name}`")]
    MissingFrame {
        /// Missing frame name.
        name: String,
    },
}

/// Tile layer to draw, paired with its depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerPlan {
    /// Layer name as authored in the map.
    pub name: String,
    /// Draw depth relative to the player at depth zero.
    pub depth: i32,
}

/// Result of a successful bootstrap.
#[derive(Debug)]
pub struct SceneSetup {
    /// Authoritative state with the player at the spawn point.
    pub world: World,
    /// Decoded animations of the selected character.
    pub animations: AnimationLibrary,
}

/// Builds worlds for a manifest and naming convention.
#[derive(Clone, Debug)]
pub struct Bootstrap {
    map: MapSettings,
    player: PlayerSettings,
    naming: AnimationNaming,
}

impl Bootstrap {
    /// Creates a bootstrap for the manifest's map and player geometry.
    #[must_use]
    pub fn new(manifest: &Manifest, naming: AnimationNaming) -> Self {
        Self {
            map: manifest.map().clone(),
            player: *manifest.player(),
            naming,
        }
    }

    /// Naming convention validated against every sprite sheet.
    #[must_use]
    pub fn naming(&self) -> &AnimationNaming {
        &self.naming
    }

    /// Name of the tileset whose texture draws every layer.
    #[must_use]
    pub fn tileset_name(&self) -> &str {
        &self.map.tileset
    }

    /// Display scale applied to the player sprite.
    #[must_use]
    pub fn player_scale(&self) -> f32 {
        self.player.scale
    }

    /// Layers drawn each frame, in authoring order.
    #[must_use]
    pub fn layer_plan(&self) -> Vec<LayerPlan> {
        vec![
            LayerPlan {
                name: self.map.below_layer.clone(),
                depth: 0,
            },
            LayerPlan {
                name: self.map.world_layer.clone(),
                depth: 0,
            },
            LayerPlan {
                name: self.map.above_layer.clone(),
                depth: self.map.above_depth,
            },
        ]
    }

    /// Derives the banner shown when the scene starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Builds the world and animation library from fully loaded assets.
    pub fn construct(&self, assets: &LoadedAssets) -> Result<SceneSetup, BootstrapError> {
        let map = TileMap::from_json(&assets.tilemap_json)?;

        if map.tileset(&self.map.tileset).is_none() {
            return Err(BootstrapError::MissingTileset {
                name: self.map.tileset.clone(),
            });
        }
        for plan in self.layer_plan() {
            if map.tile_layer(&plan.name).is_none() {
                return Err(BootstrapError::MissingLayer { name: plan.name });
            }
        }

        let spawn = map
            .find_object(&self.map.objects_layer, &self.map.spawn_point)
            .map(|object| Point::new(object.x, object.y))
            .ok_or_else(|| BootstrapError::MissingSpawnPoint {
                layer: self.map.objects_layer.clone(),
                name: self.map.spawn_point.clone(),
            })?;

        let collision = map
            .tile_layer(&self.map.world_layer)
            .map(|layer| CollisionGrid::from_layer(&map, layer))
            .ok_or_else(|| BootstrapError::MissingLayer {
                name: self.map.world_layer.clone(),
            })?;

        let animations = AnimationLibrary::from_aseprite_json(&assets.animation_json)?;
        self.validate_naming(&animations)?;

        let scale = self.player.scale;
        let (frame_width, frame_height) = animations.frame_size();
        let body = BodyShape::scaled(
            (self.player.body_offset[0], self.player.body_offset[1]),
            (self.player.body_size[0], self.player.body_size[1]),
            scale,
        );

        log::info!(
            "scene bootstrapped: {}x{} tiles, {} colliding, spawn at ({}, {})",
            map.width,
            map.height,
            collision.solid_count(),
            spawn.x,
            spawn.y
        );

        let world = World::new(
            map,
            collision,
            PlayerSetup {
                position: spawn,
                display_size: (frame_width * scale, frame_height * scale),
                body,
            },
        );

        Ok(SceneSetup { world, animations })
    }

    fn validate_naming(&self, animations: &AnimationLibrary) -> Result<(), BootstrapError> {
        for key in self.naming.walk_keys() {
            if animations.clip(key).is_none() {
                return Err(BootstrapError::MissingAnimation {
                    key: key.to_owned(),
                });
            }
        }
        for name in self.naming.idle_frames() {
            if animations.frame_index(name).is_none() {
                return Err(BootstrapError::MissingFrame {
                    name: name.to_owned(),
                });
            }
        }
        Ok(())
    }
}
