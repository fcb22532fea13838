//! Asset manifest describing the map bundle, player geometry and character roster.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use cypher_town_core::{
    AssetRequests, CharacterId, NamingPreset, CHARACTER_QUERY_PARAMETER, DEFAULT_CHARACTER,
    DEFAULT_PLAYER_SPEED,
};
use serde::Deserialize;
use thiserror::Error;

/// Manifest schema version understood by this build.
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Placeholder substituted with the character identifier in asset templates.
pub const CHARACTER_PLACEHOLDER: &str = "{character}";

/// Errors raised while reading the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest at {}", path.display())]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The manifest is not valid TOML or does not match the schema.
    #[error("failed to parse manifest toml contents")]
    Parse(#[from] toml::de::Error),
    /// The manifest declares a schema version this build does not understand.
    #[error("unsupported manifest version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version supported by this build.
        expected: u32,
    },
    /// A character identifier would escape the asset directory once expanded into a path.
    #[error("character `{id}` cannot name an asset file")]
    InvalidCharacterId {
        /// Rejected identifier.
        id: CharacterId,
    },
    /// A character is listed twice in the roster.
    #[error("manifest lists character `{id}` more than once")]
    DuplicateCharacter {
        /// Repeated identifier.
        id: CharacterId,
    },
}

/// Window and gameplay settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GameSettings {
    /// Window title.
    pub title: String,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Walking speed in pixels per second.
    pub speed: f32,
    /// Query parameter naming the active character.
    pub query_parameter: String,
    /// Character used when the location names none.
    pub default_character: CharacterId,
    /// Animation naming convention used unless a character overrides it.
    pub naming: NamingPreset,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            title: "Cypher Town".to_owned(),
            window_width: 800,
            window_height: 600,
            speed: DEFAULT_PLAYER_SPEED,
            query_parameter: CHARACTER_QUERY_PARAMETER.to_owned(),
            default_character: CharacterId::new(DEFAULT_CHARACTER),
            naming: NamingPreset::default(),
        }
    }
}

/// Shared map bundle and the names authored inside it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MapSettings {
    /// Tiled JSON map, relative to the manifest.
    pub tilemap: String,
    /// Tileset texture, relative to the manifest.
    pub tileset_image: String,
    /// Name of the tileset inside the map.
    pub tileset: String,
    /// Layer drawn beneath the player.
    pub below_layer: String,
    /// Layer drawn beneath the player that carries collision.
    pub world_layer: String,
    /// Layer drawn over the player.
    pub above_layer: String,
    /// Draw depth of the layer above the player.
    pub above_depth: i32,
    /// Object layer holding the spawn point.
    pub objects_layer: String,
    /// Name of the spawn point object.
    pub spawn_point: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tilemap: "tilemaps/tuxemon-town.json".to_owned(),
            tileset_image: "tilesets/tuxmon-sample-32px-extruded.png".to_owned(),
            tileset: "tuxmon-sample-32px-extruded".to_owned(),
            below_layer: "Below Player".to_owned(),
            world_layer: "World".to_owned(),
            above_layer: "Above Player".to_owned(),
            above_depth: 10,
            objects_layer: "Objects".to_owned(),
            spawn_point: "Spawn Point".to_owned(),
        }
    }
}

/// Player sprite and physics body geometry in frame pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerSettings {
    /// Display scale applied to frames and body alike.
    pub scale: f32,
    /// Physics body size as `[width, height]`.
    pub body_size: [f32; 2],
    /// Physics body offset from the frame's top-left corner as `[x, y]`.
    pub body_offset: [f32; 2],
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            body_size: [20.0, 12.0],
            body_offset: [15.0, 33.0],
        }
    }
}

/// Per-character asset templates.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AssetTemplates {
    /// Sprite-sheet texture template.
    pub sprite_sheet: String,
    /// Aseprite JSON template.
    pub animations: String,
}

impl Default for AssetTemplates {
    fn default() -> Self {
        Self {
            sprite_sheet: format!("sprites/{CHARACTER_PLACEHOLDER}.png"),
            animations: format!("animations/{CHARACTER_PLACEHOLDER}.json"),
        }
    }
}

/// Roster entry with optional overrides.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CharacterEntry {
    /// Identifier written into the location.
    pub id: CharacterId,
    /// Label shown by the selector; defaults to the identifier.
    #[serde(default)]
    pub label: Option<String>,
    /// Naming convention used by this character's sprite sheet.
    #[serde(default)]
    pub naming: Option<NamingPreset>,
    /// Sprite-sheet path replacing the template.
    #[serde(default)]
    pub sprite_sheet: Option<String>,
    /// Aseprite JSON path replacing the template.
    #[serde(default)]
    pub animations: Option<String>,
}

impl CharacterEntry {
    /// Label shown by the selector.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    version: u32,
    #[serde(default)]
    game: GameSettings,
    #[serde(default)]
    map: MapSettings,
    #[serde(default)]
    player: PlayerSettings,
    #[serde(default)]
    assets: AssetTemplates,
    #[serde(default)]
    characters: Vec<CharacterEntry>,
}

/// Parsed manifest with paths resolved against its directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    base: PathBuf,
    game: GameSettings,
    map: MapSettings,
    player: PlayerSettings,
    assets: AssetTemplates,
    characters: Vec<CharacterEntry>,
}

impl Manifest {
    /// Default manifest location relative to the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml(&contents, base)
    }

    /// Parses manifest contents, resolving relative paths against `base`.
    pub fn from_toml(contents: &str, base: impl Into<PathBuf>) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(contents)?;
        if raw.version != SUPPORTED_MANIFEST_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                found: raw.version,
                expected: SUPPORTED_MANIFEST_VERSION,
            });
        }

        let mut seen = HashSet::with_capacity(raw.characters.len());
        for entry in &raw.characters {
            validate_character_id(&entry.id)?;
            if !seen.insert(entry.id.clone()) {
                return Err(ManifestError::DuplicateCharacter {
                    id: entry.id.clone(),
                });
            }
        }

        Ok(Self {
            base: base.into(),
            game: raw.game,
            map: raw.map,
            player: raw.player,
            assets: raw.assets,
            characters: raw.characters,
        })
    }

    /// Window and gameplay settings.
    #[must_use]
    pub fn game(&self) -> &GameSettings {
        &self.game
    }

    /// Map bundle settings.
    #[must_use]
    pub fn map(&self) -> &MapSettings {
        &self.map
    }

    /// Player geometry.
    #[must_use]
    pub fn player(&self) -> &PlayerSettings {
        &self.player
    }

    /// Roster entries in authoring order; empty when the manifest lists none.
    #[must_use]
    pub fn characters(&self) -> &[CharacterEntry] {
        &self.characters
    }

    /// Roster entry for `id`, if listed.
    #[must_use]
    pub fn character(&self, id: &CharacterId) -> Option<&CharacterEntry> {
        self.characters.iter().find(|entry| &entry.id == id)
    }

    /// Naming convention for `id`, honouring roster overrides.
    #[must_use]
    pub fn naming_for(&self, id: &CharacterId) -> NamingPreset {
        self.character(id)
            .and_then(|entry| entry.naming)
            .unwrap_or(self.game.naming)
    }

    /// Files to load for `id`, with templates expanded and paths resolved.
    ///
    /// Identifiers holding path separators or `..` are rejected before any path is built.
    pub fn asset_requests(&self, id: &CharacterId) -> Result<AssetRequests, ManifestError> {
        validate_character_id(id)?;
        let entry = self.character(id);
        let sprite_sheet = entry
            .and_then(|entry| entry.sprite_sheet.as_deref())
            .unwrap_or(&self.assets.sprite_sheet);
        let animations = entry
            .and_then(|entry| entry.animations.as_deref())
            .unwrap_or(&self.assets.animations);

        Ok(AssetRequests {
            tilemap: self.base.join(&self.map.tilemap),
            tileset_image: self.base.join(&self.map.tileset_image),
            sprite_sheet: self.base.join(expand_template(sprite_sheet, id)),
            animations: self.base.join(expand_template(animations, id)),
        })
    }
}

fn validate_character_id(id: &CharacterId) -> Result<(), ManifestError> {
    let raw = id.as_str();
    if raw.contains(['/', '\\']) || raw.contains("..") {
        return Err(ManifestError::InvalidCharacterId { id: id.clone() });
    }
    Ok(())
}

fn expand_template(template: &str, id: &CharacterId) -> String {
    template.replace(CHARACTER_PLACEHOLDER, id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_manifest_uses_defaults() {
        let manifest = Manifest::from_toml("version = 1", "assets").expect("manifest parses");

        assert_eq!(manifest.game(), &GameSettings::default());
        assert_eq!(manifest.map(), &MapSettings::default());
        assert_eq!(manifest.player(), &PlayerSettings::default());
        assert!(manifest.characters().is_empty());
    }

    #[test]
    fn rejects_unsupported_versions() {
        let error = Manifest::from_toml("version = 2", "assets").expect_err("version 2 is unknown");

        assert!(matches!(
            error,
            ManifestError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = Manifest::from_toml("version = 1\n[game]\nspeeed = 10.0\n", "assets");

        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn template_expansion_replaces_every_placeholder() {
        let id = CharacterId::new("342");

        assert_eq!(
            expand_template("{character}/{character}.json", &id),
            "342/342.json"
        );
        assert_eq!(expand_template("shared.png", &id), "shared.png");
    }
}
