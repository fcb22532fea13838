//! Small map and sprite sheet shared by the binary's unit tests.

use cypher_town_core::{AnimationNaming, CharacterId, LoadedAssets, NamingPreset};
use cypher_town_location::{default_roster, CharacterSelector, Location};
use cypher_town_rendering::Scene;
use cypher_town_system_bootstrap::{Bootstrap, Manifest, SceneSetup};
use cypher_town_system_locomotion::Locomotion;
use serde_json::{json, Value};

use crate::{scene, session::GameSession};

fn tile_layer(name: &str, data: [u32; 6]) -> Value {
    json!({
        "type": "tilelayer",
        "name": name,
        "width": 3,
        "height": 2,
        "data": data,
        "opacity": 1,
        "visible": true
    })
}

fn map_json() -> String {
    json!({
        "width": 3,
        "height": 2,
        "tilewidth": 32,
        "tileheight": 32,
        "layers": [
            tile_layer("Below Player", [1, 1, 1, 1, 1, 1]),
            tile_layer("World", [0, 0, 2, 0, 0, 0]),
            tile_layer("Above Player", [0; 6]),
            {
                "type": "objectgroup",
                "name": "Objects",
                "objects": [{ "id": 1, "name": "Spawn Point", "x": 48.0, "y": 32.0 }]
            }
        ],
        "tilesets": [{
            "firstgid": 1,
            "name": "tuxmon-sample-32px-extruded",
            "tilewidth": 32,
            "tileheight": 32,
            "columns": 4,
            "tileproperties": { "1": { "collides": true } }
        }]
    })
    .to_string()
}

fn sheet_json() -> String {
    let frames: Vec<Value> = (0..16)
        .map(|index| {
            json!({
                "filename": index.to_string(),
                "frame": { "x": (index % 4) * 48, "y": (index / 4) * 48, "w": 48, "h": 48 },
                "duration": 100
            })
        })
        .collect();
    let tags: Vec<Value> = ["walking south", "walking left", "walking north", "walking right"]
        .iter()
        .enumerate()
        .map(|(index, name)| json!({ "name": name, "from": index * 4, "to": index * 4 + 3 }))
        .collect();
    json!({ "frames": frames, "meta": { "frameTags": tags } }).to_string()
}

pub(crate) fn fixture_bootstrap() -> Bootstrap {
    let manifest = Manifest::from_toml("version = 1", "assets").expect("manifest parses");
    Bootstrap::new(&manifest, AnimationNaming::from_preset(NamingPreset::Compass))
}

pub(crate) fn fixture_setup(bootstrap: &Bootstrap) -> SceneSetup {
    bootstrap
        .construct(&LoadedAssets {
            tilemap_json: map_json(),
            animation_json: sheet_json(),
        })
        .expect("fixture scene constructs")
}

pub(crate) fn fixture_selector() -> CharacterSelector {
    CharacterSelector::new("character", CharacterId::default(), default_roster())
        .expect("default roster is valid")
}

pub(crate) fn fixture_session(url: &str) -> (GameSession, Scene) {
    let bootstrap = fixture_bootstrap();
    let SceneSetup { world, animations } = fixture_setup(&bootstrap);
    let selector = fixture_selector();
    let location = Location::new(url);

    let scene = scene::initial_scene(&world, animations, &bootstrap, &selector, &location);
    let session = GameSession::new(
        world,
        Locomotion::default(),
        selector,
        location,
        bootstrap.naming().clone(),
    );
    (session, scene)
}
