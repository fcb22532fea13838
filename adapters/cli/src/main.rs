#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Cypher Town experience.

mod scene;
mod session;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cypher_town_core::{AnimationNaming, NamingPreset};
use cypher_town_location::{default_roster, CharacterOption, CharacterSelector, Location};
use cypher_town_rendering::{validate_window_size, Color, Presentation, RenderingBackend};
use cypher_town_rendering_macroquad::MacroquadBackend;
use cypher_town_system_bootstrap::{Bootstrap, Manifest, SceneSetup};
use cypher_town_system_locomotion::Locomotion;

use session::GameSession;

const CLEAR_COLOR: Color = Color::from_rgb_u8(0, 0, 0);

/// Walk a character around a tile-map town.
#[derive(Debug, Parser)]
#[command(name = "cypher-town", version)]
struct Cli {
    /// Page location whose query string names the character.
    #[arg(long, default_value = "http://localhost/")]
    url: String,
    /// Asset manifest describing the map and the character roster.
    #[arg(long, default_value_os_t = Manifest::default_path())]
    manifest: PathBuf,
    /// Animation naming convention, overriding the manifest.
    #[arg(long)]
    naming: Option<NamingPreset>,
    /// Walking speed in pixels per second, overriding the manifest.
    #[arg(long)]
    speed: Option<f32>,
    /// Render as fast as possible instead of syncing to the display.
    #[arg(long)]
    no_vsync: bool,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Cypher Town command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(Cli::parse()).map_err(|error| {
        log::error!("{error:#}");
        error
    })
}

fn run(cli: Cli) -> Result<()> {
    let manifest = Manifest::load(&cli.manifest)
        .with_context(|| format!("failed to load manifest {}", cli.manifest.display()))?;
    let game = manifest.game();

    let selector = CharacterSelector::new(
        game.query_parameter.clone(),
        game.default_character.clone(),
        roster(&manifest),
    )
    .context("invalid character roster")?;
    let location = Location::new(cli.url);
    let character = selector.current(&location);

    let preset = cli
        .naming
        .unwrap_or_else(|| manifest.naming_for(&character));
    let naming = AnimationNaming::from_preset(preset);
    let locomotion = Locomotion::new(cli.speed.unwrap_or(game.speed))?;
    let bootstrap = Bootstrap::new(&manifest, naming.clone());

    let window_size = validate_window_size(game.window_width, game.window_height)?;
    let requests = manifest
        .asset_requests(&character)
        .with_context(|| format!("cannot load assets for character `{character}`"))?;
    let presentation = Presentation::new(game.title.clone(), CLEAR_COLOR, window_size, requests);
    log::info!(
        "starting {} as character `{character}` with {preset:?} animation names",
        game.title
    );

    let backend = MacroquadBackend::new()
        .with_vsync(!cli.no_vsync)
        .with_show_fps(cli.show_fps);

    backend.run(
        presentation,
        move |assets| {
            let SceneSetup { world, animations } = bootstrap
                .construct(&assets)
                .with_context(|| format!("failed to build the scene for `{character}`"))?;
            let scene = scene::initial_scene(&world, animations, &bootstrap, &selector, &location);
            let session = GameSession::new(world, locomotion, selector, location, naming);
            Ok((scene, session))
        },
        |session: &mut GameSession, dt, input, scene| session.update(dt, input, scene),
    )
}

/// Roster listed by the manifest, or the built-in one when it lists none.
fn roster(manifest: &Manifest) -> Vec<CharacterOption> {
    if manifest.characters().is_empty() {
        return default_roster();
    }

    manifest
        .characters()
        .iter()
        .map(|entry| CharacterOption::new(entry.id.as_str(), entry.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_shipped_manifest() {
        let cli = Cli::try_parse_from(["cypher-town"]).expect("defaults parse");

        assert_eq!(cli.url, "http://localhost/");
        assert_eq!(cli.manifest, Manifest::default_path());
        assert!(cli.naming.is_none());
        assert!(!cli.no_vsync);
    }

    #[test]
    fn naming_and_speed_overrides_parse() {
        let cli = Cli::try_parse_from([
            "cypher-town",
            "--url",
            "http://localhost/?character=342",
            "--naming",
            "screen",
            "--speed",
            "120",
        ])
        .expect("overrides parse");

        assert_eq!(cli.naming, Some(NamingPreset::Screen));
        assert_eq!(cli.speed, Some(120.0));
        assert!(Cli::try_parse_from(["cypher-town", "--naming", "diagonal"]).is_err());
    }

    #[test]
    fn empty_manifest_roster_falls_back_to_built_in_characters() {
        let manifest = Manifest::from_toml("version = 1", "assets").expect("manifest parses");

        assert_eq!(roster(&manifest), default_roster());
    }

    #[test]
    fn manifest_roster_keeps_order_and_labels() {
        let manifest = Manifest::from_toml(
            r#"
            version = 1

            [[characters]]
            id = "342"

            [[characters]]
            id = "1718"
            label = "Bunny"
            "#,
            "assets",
        )
        .expect("manifest parses");

        assert_eq!(
            roster(&manifest),
            vec![
                CharacterOption::new("342", "342"),
                CharacterOption::new("1718", "Bunny"),
            ]
        );
    }
}
