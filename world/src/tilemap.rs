//! Data model for maps exported by the Tiled editor in its JSON format.
//!
//! Only the subset the demo draws is modelled: orthogonal tile layers stored as
//! plain GID arrays, object groups, and embedded tilesets. Tile properties are
//! read from both the current `tiles[].properties` list and the older
//! `tileproperties` map that maps exported with Tiled 1.1 still carry.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Bits Tiled stores in a GID to flip or rotate a tile.
const GID_FLAG_MASK: u32 = 0xF000_0000;

/// Errors raised while decoding a Tiled map.
#[derive(Debug, Error)]
pub enum TileMapError {
    /// The JSON document did not match the Tiled map schema.
    #[error("failed to parse tile map json")]
    Parse(#[from] serde_json::Error),
    /// Tile width or height was zero.
    #[error("tile map declares a zero-sized tile ({width}x{height})")]
    ZeroTileSize {
        /// Declared tile width in pixels.
        width: u32,
        /// Declared tile height in pixels.
        height: u32,
    },
    /// A tile layer's data does not cover its declared dimensions.
    #[error("tile layer `{layer}` holds {actual} tiles but declares {expected}")]
    LayerSizeMismatch {
        /// Name of the offending layer.
        layer: String,
        /// Number of tiles implied by the layer dimensions.
        expected: usize,
        /// Number of tiles present in the data array.
        actual: usize,
    },
}

/// Orthogonal tile map with its layers and tilesets.
#[derive(Clone, Debug, Deserialize)]
pub struct TileMap {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Width of a single tile in pixels.
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    /// Height of a single tile in pixels.
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    /// Layers in draw order.
    #[serde(default)]
    pub layers: Vec<MapLayer>,
    /// Embedded tilesets.
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
}

impl TileMap {
    /// Decodes a map from its JSON representation and validates layer sizes.
    pub fn from_json(contents: &str) -> Result<Self, TileMapError> {
        let map: Self = serde_json::from_str(contents)?;
        if map.tile_width == 0 || map.tile_height == 0 {
            return Err(TileMapError::ZeroTileSize {
                width: map.tile_width,
                height: map.tile_height,
            });
        }

        for layer in &map.layers {
            if let MapLayer::Tiles(tiles) = layer {
                let expected = tiles.width as usize * tiles.height as usize;
                if tiles.data.len() != expected {
                    return Err(TileMapError::LayerSizeMismatch {
                        layer: tiles.name.clone(),
                        expected,
                        actual: tiles.data.len(),
                    });
                }
            }
        }

        Ok(map)
    }

    /// Total width of the map in pixels.
    #[must_use]
    pub fn width_in_pixels(&self) -> f32 {
        self.width as f32 * self.tile_width as f32
    }

    /// Total height of the map in pixels.
    #[must_use]
    pub fn height_in_pixels(&self) -> f32 {
        self.height as f32 * self.tile_height as f32
    }

    /// Finds a tile layer by name.
    #[must_use]
    pub fn tile_layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find_map(|layer| match layer {
            MapLayer::Tiles(tiles) if tiles.name == name => Some(tiles),
            _ => None,
        })
    }

    /// Finds an object layer by name.
    #[must_use]
    pub fn object_layer(&self, name: &str) -> Option<&ObjectLayer> {
        self.layers.iter().find_map(|layer| match layer {
            MapLayer::Objects(objects) if objects.name == name => Some(objects),
            _ => None,
        })
    }

    /// Finds the first object called `object` inside the object layer `layer`.
    #[must_use]
    pub fn find_object(&self, layer: &str, object: &str) -> Option<&MapObject> {
        self.object_layer(layer)?
            .objects
            .iter()
            .find(|candidate| candidate.name == object)
    }

    /// Finds a tileset by the name it was given in the editor.
    #[must_use]
    pub fn tileset(&self, name: &str) -> Option<&Tileset> {
        self.tilesets.iter().find(|tileset| tileset.name == name)
    }

    /// Resolves the tileset owning `gid` and the tile's local index within it.
    #[must_use]
    pub fn resolve_gid(&self, gid: u32) -> Option<(&Tileset, u32)> {
        let gid = strip_gid_flags(gid);
        if gid == 0 {
            return None;
        }

        self.tilesets
            .iter()
            .filter(|tileset| tileset.first_gid <= gid)
            .max_by_key(|tileset| tileset.first_gid)
            .map(|tileset| (tileset, gid - tileset.first_gid))
    }

    /// Returns `true` when the tile referenced by `gid` carries a boolean `true` property.
    #[must_use]
    pub fn tile_flag(&self, gid: u32, property: &str) -> bool {
        self.resolve_gid(gid)
            .and_then(|(tileset, local)| tileset.tile_property(local, property))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Removes the flip and rotation bits Tiled packs into a GID.
#[must_use]
pub fn strip_gid_flags(gid: u32) -> u32 {
    gid & !GID_FLAG_MASK
}

/// Layer kinds the demo understands.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum MapLayer {
    /// Grid of tile GIDs.
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    /// Free-form objects such as spawn points.
    #[serde(rename = "objectgroup")]
    Objects(ObjectLayer),
    /// Image and group layers are accepted but ignored.
    #[serde(other)]
    Unsupported,
}

/// Layer of tiles stored row-major as GIDs, zero meaning empty.
#[derive(Clone, Debug, Deserialize)]
pub struct TileLayer {
    /// Layer name assigned in the editor.
    pub name: String,
    /// Number of columns in the layer.
    pub width: u32,
    /// Number of rows in the layer.
    pub height: u32,
    /// Row-major GIDs.
    pub data: Vec<u32>,
    /// Whether the layer is drawn.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Layer opacity in the range 0.0..=1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl TileLayer {
    /// GID stored at the provided cell with flip bits removed, zero when empty or out of range.
    #[must_use]
    pub fn gid_at(&self, column: u32, row: u32) -> u32 {
        if column >= self.width || row >= self.height {
            return 0;
        }

        let index = row as usize * self.width as usize + column as usize;
        self.data.get(index).copied().map(strip_gid_flags).unwrap_or(0)
    }

    /// Iterates over non-empty cells as `(column, row, gid)` triples.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let width = self.width.max(1);
        self.data.iter().enumerate().filter_map(move |(index, gid)| {
            let gid = strip_gid_flags(*gid);
            if gid == 0 {
                return None;
            }
            let index = index as u32;
            Some((index % width, index / width, gid))
        })
    }
}

/// Layer holding named map objects.
#[derive(Clone, Debug, Deserialize)]
pub struct ObjectLayer {
    /// Layer name assigned in the editor.
    pub name: String,
    /// Objects in editor order.
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

/// Named object placed in an object layer.
#[derive(Clone, Debug, Deserialize)]
pub struct MapObject {
    /// Unique object identifier.
    #[serde(default)]
    pub id: u32,
    /// Object name, used to locate spawn points.
    #[serde(default)]
    pub name: String,
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
    /// Object width, zero for points.
    #[serde(default)]
    pub width: f32,
    /// Object height, zero for points.
    #[serde(default)]
    pub height: f32,
}

/// Tileset embedded in the map.
#[derive(Clone, Debug, Deserialize)]
pub struct Tileset {
    /// First GID assigned to this tileset.
    #[serde(rename = "firstgid")]
    pub first_gid: u32,
    /// Name assigned in the editor.
    pub name: String,
    /// Image path as written by the editor.
    #[serde(default)]
    pub image: String,
    /// Width of a single tile in pixels.
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    /// Height of a single tile in pixels.
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    /// Number of tile columns in the image.
    pub columns: u32,
    /// Pixels between the image border and the first tile.
    #[serde(default)]
    pub margin: u32,
    /// Pixels between neighbouring tiles.
    #[serde(default)]
    pub spacing: u32,
    /// Per-tile metadata in the current export format.
    #[serde(default)]
    pub tiles: Vec<TileDefinition>,
    /// Per-tile properties in the Tiled 1.1 export format.
    #[serde(rename = "tileproperties", default)]
    pub legacy_properties: HashMap<String, HashMap<String, Value>>,
}

impl Tileset {
    /// Looks up a custom property of the tile with the provided local index.
    #[must_use]
    pub fn tile_property(&self, local: u32, name: &str) -> Option<&Value> {
        let current = self
            .tiles
            .iter()
            .find(|tile| tile.id == local)
            .and_then(|tile| tile.properties.iter().find(|property| property.name == name))
            .map(|property| &property.value);

        current.or_else(|| {
            self.legacy_properties
                .get(&local.to_string())
                .and_then(|properties| properties.get(name))
        })
    }

    /// Source rectangle of the tile with the provided local index inside the tileset image.
    #[must_use]
    pub fn source_rect(&self, local: u32) -> PixelRect {
        let columns = self.columns.max(1);
        let column = (local % columns) as f32;
        let row = (local / columns) as f32;
        let margin = self.margin as f32;
        let spacing = self.spacing as f32;

        PixelRect::new(
            margin + column * (self.tile_width as f32 + spacing),
            margin + row * (self.tile_height as f32 + spacing),
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }
}

/// Metadata attached to a single tile.
#[derive(Clone, Debug, Deserialize)]
pub struct TileDefinition {
    /// Local tile index within the tileset.
    pub id: u32,
    /// Custom properties.
    #[serde(default)]
    pub properties: Vec<TileProperty>,
}

/// Custom property authored in the editor.
#[derive(Clone, Debug, Deserialize)]
pub struct TileProperty {
    /// Property name.
    pub name: String,
    /// Property value.
    pub value: Value,
}

/// Pixel rectangle inside a source image such as a tileset or a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl PixelRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

const fn default_visible() -> bool {
    true
}

const fn default_opacity() -> f32 {
    1.0
}
