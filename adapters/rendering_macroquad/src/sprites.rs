use std::{collections::HashMap, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec2;
use macroquad::{
    math::{Rect as MacroquadRect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};
use cypher_town_rendering::{AssetRequests, LoadedAssets, Rect};

const ALL_TEXTURE_ROLES: [TextureRole; 2] = [TextureRole::Tileset, TextureRole::SpriteSheet];

/// Purpose of a texture within the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TextureRole {
    /// Tiles referenced by every map layer.
    Tileset,
    /// Frames of the player's sprite sheet.
    SpriteSheet,
}

/// Textures uploaded for the active scene.
#[derive(Debug)]
pub(crate) struct SceneTextures {
    textures: HashMap<TextureRole, Texture2D>,
}

impl SceneTextures {
    /// Loads every requested file, uploading textures and returning the text assets.
    pub(crate) async fn load(requests: &AssetRequests) -> Result<(Self, LoadedAssets)> {
        let tilemap_json = load_text(&requests.tilemap).await?;
        let animation_json = load_text(&requests.animations).await?;

        let mut entries = Vec::with_capacity(ALL_TEXTURE_ROLES.len());
        for (role, path) in [
            (TextureRole::Tileset, requests.tileset_image.as_path()),
            (TextureRole::SpriteSheet, requests.sprite_sheet.as_path()),
        ] {
            entries.push((role, load_bytes(path).await?));
        }

        let textures = Self::from_entries(entries, &mut decode_texture)?;
        log::info!(
            "loaded scene assets: map {}, tileset {}, sprite sheet {}",
            requests.tilemap.display(),
            requests.tileset_image.display(),
            requests.sprite_sheet.display()
        );

        Ok((
            textures,
            LoadedAssets {
                tilemap_json,
                animation_json,
            },
        ))
    }

    /// Retrieves the texture associated with the provided role.
    #[must_use]
    pub(crate) fn texture(&self, role: TextureRole) -> Option<Texture2D> {
        self.textures.get(&role).copied()
    }

    /// Draws `source` from the role's texture into `destination`, both in pixels.
    pub(crate) fn draw_region(
        &self,
        role: TextureRole,
        source: Rect,
        destination: Rect,
        opacity: f32,
    ) -> Result<()> {
        let texture = self
            .texture(role)
            .with_context(|| format!("texture {role:?} missing from scene"))?;
        let (x, y, params) = region_params(source, destination);
        let tint = macroquad::color::Color::new(1.0, 1.0, 1.0, opacity);
        texture::draw_texture_ex(texture, x, y, tint, params);
        Ok(())
    }

    fn from_entries(
        entries: Vec<(TextureRole, Vec<u8>)>,
        decoder: &mut impl FnMut(TextureRole, &[u8]) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (role, bytes) in entries {
            let texture = decoder(role, &bytes)
                .with_context(|| format!("failed to decode texture {role:?}"))?;
            if textures.insert(role, texture).is_some() {
                bail!("duplicate texture entry for {role:?}");
            }
        }
        for role in ALL_TEXTURE_ROLES {
            if !textures.contains_key(&role) {
                bail!("scene is missing texture {role:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn decode_texture(_role: TextureRole, bytes: &[u8]) -> Result<Texture2D> {
    let texture = Texture2D::from_file_with_format(bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

async fn load_bytes(path: &Path) -> Result<Vec<u8>> {
    macroquad::file::load_file(&path.to_string_lossy())
        .await
        .map_err(|error| anyhow!("failed to read asset at {}: {error:?}", path.display()))
}

async fn load_text(path: &Path) -> Result<String> {
    let bytes = load_bytes(path).await?;
    String::from_utf8(bytes)
        .with_context(|| format!("asset at {} is not valid UTF-8", path.display()))
}

fn region_params(source: Rect, destination: Rect) -> (f32, f32, DrawTextureParams) {
    let params = DrawTextureParams {
        dest_size: Some(MacroquadVec2::new(destination.width, destination.height)),
        source: Some(MacroquadRect::new(
            source.x,
            source.y,
            source.width,
            source.height,
        )),
        ..DrawTextureParams::default()
    };
    (destination.x, destination.y, params)
}

/// Returns whether a rectangle in view space overlaps a viewport anchored at the origin.
#[must_use]
pub(crate) fn is_visible(rect: Rect, viewport: Vec2) -> bool {
    rect.x < viewport.x
        && rect.y < viewport.y
        && rect.x + rect.width > 0.0
        && rect.y + rect.height > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn textures_decode_in_entry_order() {
        let entries = vec![
            (TextureRole::SpriteSheet, vec![1, 2, 3]),
            (TextureRole::Tileset, vec![4, 5]),
        ];
        let decoded = RefCell::new(Vec::new());
        let textures = SceneTextures::from_entries(entries, &mut |role, bytes| {
            decoded.borrow_mut().push((role, bytes.len()));
            Ok(Texture2D::empty())
        })
        .expect("both roles present");

        assert_eq!(
            decoded.borrow().as_slice(),
            &[(TextureRole::SpriteSheet, 3), (TextureRole::Tileset, 2)]
        );
        for role in ALL_TEXTURE_ROLES {
            assert!(textures.texture(role).is_some());
        }
    }

    #[test]
    fn missing_or_duplicate_roles_are_rejected() {
        let missing = SceneTextures::from_entries(
            vec![(TextureRole::Tileset, Vec::new())],
            &mut |_, _| Ok(Texture2D::empty()),
        );
        assert!(missing.is_err(), "sprite sheet is required");

        let duplicate = SceneTextures::from_entries(
            vec![
                (TextureRole::Tileset, Vec::new()),
                (TextureRole::Tileset, Vec::new()),
                (TextureRole::SpriteSheet, Vec::new()),
            ],
            &mut |_, _| Ok(Texture2D::empty()),
        );
        assert!(duplicate.is_err(), "duplicate tileset must be rejected");
    }

    #[test]
    fn region_params_map_source_and_destination() {
        let (x, y, params) = region_params(
            Rect::new(33.0, 1.0, 32.0, 32.0),
            Rect::new(-12.0, 40.0, 32.0, 32.0),
        );

        assert_eq!((x, y), (-12.0, 40.0));
        assert_eq!(params.dest_size, Some(MacroquadVec2::new(32.0, 32.0)));
        assert_eq!(
            params.source,
            Some(MacroquadRect::new(33.0, 1.0, 32.0, 32.0))
        );
    }

    #[test]
    fn visibility_culls_rectangles_outside_viewport() {
        let viewport = Vec2::new(800.0, 600.0);

        assert!(is_visible(Rect::new(-31.0, 0.0, 32.0, 32.0), viewport));
        assert!(!is_visible(Rect::new(-32.0, 0.0, 32.0, 32.0), viewport));
        assert!(!is_visible(Rect::new(800.0, 10.0, 32.0, 32.0), viewport));
        assert!(is_visible(Rect::new(799.0, 599.0, 32.0, 32.0), viewport));
    }
}
