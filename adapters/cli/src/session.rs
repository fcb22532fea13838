//! Per-frame driver that routes input through the systems into the world and scene.

use std::time::Duration;

use cypher_town_core::{AnimationNaming, Command, Event};
use cypher_town_location::{CharacterSelector, Location};
use cypher_town_rendering::{FrameInput, Scene};
use cypher_town_system_debug_overlay::DebugOverlayToggle;
use cypher_town_system_locomotion::Locomotion;
use cypher_town_world::{self as world, query, PoseRequest, World};

use crate::scene;

/// Mutable game state owned by the rendering loop.
#[derive(Debug)]
pub(crate) struct GameSession {
    world: World,
    locomotion: Locomotion,
    debug_overlay: DebugOverlayToggle,
    selector: CharacterSelector,
    location: Location,
    naming: AnimationNaming,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl GameSession {
    pub(crate) fn new(
        world: World,
        locomotion: Locomotion,
        selector: CharacterSelector,
        location: Location,
        naming: AnimationNaming,
    ) -> Self {
        Self {
            world,
            locomotion,
            debug_overlay: DebugOverlayToggle::default(),
            selector,
            location,
            naming,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Advances the session by one frame and mirrors the result into `scene`.
    pub(crate) fn update(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        self.commands.clear();
        self.events.clear();

        self.locomotion.handle(
            input.directional,
            query::player_velocity(&self.world),
            &mut self.commands,
        );
        self.debug_overlay
            .handle(input.debug_pressed, &mut self.commands);
        self.commands.push(Command::Tick { dt });

        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        for event in self.events.drain(..) {
            match event {
                Event::PlayerPoseChanged { pose } => {
                    let request = PoseRequest::from_pose(pose, &self.naming);
                    if let Err(error) = scene.player.animation.request(&request, &scene.animations)
                    {
                        log::warn!("cannot present pose {pose:?}: {error}");
                    }
                }
                Event::DebugOverlayEnabled => {
                    scene.debug_overlay = Some(scene::debug_overlay(&self.world));
                }
                Event::TimeAdvanced { .. } | Event::PlayerMoved { .. } => {}
            }
        }

        if let Some(index) = input.character_selection {
            self.select_character(index, scene);
        }

        scene.player.animation.advance(dt, &scene.animations);
        scene.player.position = scene::player_position(&self.world);
        if let Some(overlay) = scene.debug_overlay.as_mut() {
            overlay.body = scene::body_rect(query::player(&self.world).body);
        }
    }

    #[cfg(test)]
    pub(crate) fn location(&self) -> &Location {
        &self.location
    }

    fn select_character(&mut self, index: usize, scene: &mut Scene) {
        match self.selector.select(&mut self.location, index) {
            Ok(character) => {
                log::info!("character `{character}` takes effect when the page is reloaded");
                scene.selector = scene::selector_view(&self.selector, &self.location);
            }
            Err(error) => log::warn!("ignoring character selection: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_selector, fixture_session};
    use cypher_town_core::DirectionalInput;
    use glam::Vec2;

    const FRAME: Duration = Duration::from_millis(250);

    fn held(directional: DirectionalInput) -> FrameInput {
        FrameInput {
            directional,
            ..FrameInput::default()
        }
    }

    const RIGHT: DirectionalInput = DirectionalInput::new(false, false, false, true);

    #[test]
    fn holding_right_walks_and_moves_the_player() {
        let (mut session, mut scene) = fixture_session("/?character=342");

        session.update(FRAME, held(RIGHT), &mut scene);

        assert_eq!(scene.player.position, Vec2::new(48.0 + 43.75, 32.0));
        assert_eq!(
            scene.player.animation.current_animation(),
            Some("walking right")
        );
    }

    #[test]
    fn releasing_keys_shows_idle_frame_for_last_direction() {
        let (mut session, mut scene) = fixture_session("/");

        session.update(FRAME, held(RIGHT), &mut scene);
        session.update(FRAME, held(DirectionalInput::NONE), &mut scene);

        assert!(!scene.player.animation.is_playing());
        assert_eq!(scene.player.animation.current_frame(), 12);
        assert_eq!(scene.player.position, Vec2::new(48.0 + 43.75, 32.0));

        session.update(FRAME, held(DirectionalInput::NONE), &mut scene);
        assert_eq!(scene.player.animation.current_frame(), 12, "held frame stays");
    }

    #[test]
    fn debug_overlay_appears_once_and_follows_the_body() {
        let (mut session, mut scene) = fixture_session("/");
        let debug = FrameInput {
            debug_pressed: true,
            ..FrameInput::default()
        };

        session.update(FRAME, debug.clone(), &mut scene);
        let overlay = scene.debug_overlay.clone().expect("overlay enabled");
        assert_eq!(overlay.solid_tiles.len(), 1);

        session.update(FRAME, held(RIGHT), &mut scene);
        session.update(FRAME, debug, &mut scene);

        let moved = scene.debug_overlay.as_ref().expect("overlay stays enabled");
        assert_eq!(moved.body.x, overlay.body.x + 43.75);
        assert_eq!(moved.solid_tiles, overlay.solid_tiles);
    }

    #[test]
    fn character_selection_rewrites_location_only() {
        let (mut session, mut scene) = fixture_session("http://localhost/town?zoom=2#map");
        let before = scene.player.clone();

        session.update(
            FRAME,
            FrameInput {
                character_selection: Some(2),
                ..FrameInput::default()
            },
            &mut scene,
        );

        assert_eq!(
            session.location().as_str(),
            "http://localhost/town?zoom=2&character=character3#map"
        );
        assert_eq!(scene.selector.selected, 2);
        assert_eq!(scene.player, before);
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let (mut session, mut scene) = fixture_session("/?character=342");
        let selector = fixture_selector();
        let len = selector.options().len();

        session.update(
            FRAME,
            FrameInput {
                character_selection: Some(len),
                ..FrameInput::default()
            },
            &mut scene,
        );

        assert_eq!(session.location().as_str(), "/?character=342");
        assert_eq!(scene.selector.selected, len - 1);
    }
}
