//! Projection of the authoritative world into render scenes.

use cypher_town_location::{CharacterSelector, Location};
use cypher_town_rendering::{
    DebugOverlay, Hud, PlayerSprite, Rect, Scene, SceneLayer, SceneTile, Segment, SelectorView,
};
use cypher_town_system_bootstrap::{Bootstrap, LayerPlan};
use cypher_town_world::{query, Aabb, AnimationLibrary, AnimationPlayer, TileMap, World};
use glam::Vec2;

const HUD_POSITION: Vec2 = Vec2::new(16.0, 16.0);

/// Builds the first scene for a freshly bootstrapped world.
pub(crate) fn initial_scene(
    world: &World,
    animations: AnimationLibrary,
    bootstrap: &Bootstrap,
    selector: &CharacterSelector,
    location: &Location,
) -> Scene {
    let map = query::tile_map(world);
    let layers = bootstrap
        .layer_plan()
        .iter()
        .filter_map(|plan| project_layer(map, plan, bootstrap.tileset_name()))
        .collect();
    let (width, height) = query::map_bounds(world);

    Scene {
        map_size: Vec2::new(width, height),
        layers,
        animations,
        player: PlayerSprite {
            position: player_position(world),
            scale: bootstrap.player_scale(),
            depth: 0,
            animation: AnimationPlayer::new(0),
        },
        debug_overlay: None,
        hud: Hud {
            text: bootstrap.welcome_banner(world).to_owned(),
            position: HUD_POSITION,
        },
        selector: selector_view(selector, location),
    }
}

/// Sprite centre of the player in map pixels.
pub(crate) fn player_position(world: &World) -> Vec2 {
    let position = query::player(world).position;
    Vec2::new(position.x, position.y)
}

fn project_layer(map: &TileMap, plan: &LayerPlan, tileset_name: &str) -> Option<SceneLayer> {
    let layer = map.tile_layer(&plan.name)?;
    if !layer.visible {
        return None;
    }

    let tile_width = map.tile_width as f32;
    let tile_height = map.tile_height as f32;
    let tiles = layer
        .tiles()
        .filter_map(|(column, row, gid)| {
            let (tileset, local) = map.resolve_gid(gid)?;
            if tileset.name != tileset_name {
                return None;
            }
            let source = tileset.source_rect(local);
            Some(SceneTile {
                destination: Rect::new(
                    column as f32 * tile_width,
                    (row + 1) as f32 * tile_height - source.height,
                    source.width,
                    source.height,
                ),
                source: source.into(),
            })
        })
        .collect();

    Some(SceneLayer {
        name: plan.name.clone(),
        depth: plan.depth,
        opacity: layer.opacity.clamp(0.0, 1.0),
        tiles,
    })
}

/// Collision diagnostics for the current world state.
pub(crate) fn debug_overlay(world: &World) -> DebugOverlay {
    let grid = query::collision_grid(world);
    let (tile_width, tile_height) = grid.tile_size();

    let mut solid_tiles = Vec::with_capacity(grid.solid_count());
    let mut faces = Vec::new();
    for (column, row, exposed) in grid.solid_cells() {
        let left = column as f32 * tile_width;
        let top = row as f32 * tile_height;
        let right = left + tile_width;
        let bottom = top + tile_height;
        solid_tiles.push(Rect::new(left, top, tile_width, tile_height));

        if exposed.top {
            faces.push(Segment::new(Vec2::new(left, top), Vec2::new(right, top)));
        }
        if exposed.bottom {
            faces.push(Segment::new(Vec2::new(left, bottom), Vec2::new(right, bottom)));
        }
        if exposed.left {
            faces.push(Segment::new(Vec2::new(left, top), Vec2::new(left, bottom)));
        }
        if exposed.right {
            faces.push(Segment::new(Vec2::new(right, top), Vec2::new(right, bottom)));
        }
    }

    DebugOverlay::new(solid_tiles, faces, body_rect(query::player(world).body))
}

/// Player physics body in render coordinates.
pub(crate) fn body_rect(body: Aabb) -> Rect {
    Rect::new(body.x, body.y, body.width, body.height)
}

/// Dropdown state for the character named by `location`.
///
/// A character missing from the roster is listed as an extra custom entry.
pub(crate) fn selector_view(selector: &CharacterSelector, location: &Location) -> SelectorView {
    let mut labels: Vec<String> = selector
        .labels()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let selected = match selector.selected_index(location) {
        Some(index) => index,
        None => {
            labels.push(format!("Custom ({})", selector.current(location)));
            labels.len() - 1
        }
    };

    SelectorView { labels, selected }
}
