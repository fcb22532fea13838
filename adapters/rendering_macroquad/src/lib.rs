#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Cypher Town.
//!
//! The demo is silent, so macroquad is pulled in without its `audio` feature
//! and no ALSA headers are needed to build or test.
//!
//! Tiles and sprites go through the `sprites` module; the instructions panel and the
//! character dropdown through `ui`.

mod sprites;
mod ui;

use self::{
    sprites::{is_visible, SceneTextures, TextureRole},
    ui::{draw_hud_ui, draw_selector_ui, HudUiContext, SelectorUiContext},
};
use anyhow::Result;
use cypher_town_core::DirectionalInput;
use cypher_town_rendering::{
    camera_origin, DebugOverlay, DrawItem, FrameInput, LoadedAssets, Presentation,
    RenderingBackend, Scene, SceneLayer,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_down, is_key_pressed, KeyCode},
    math::Vec2 as MacroquadVec2,
};
use std::{sync::mpsc, time::Duration};

const SELECTOR_SIZE: Vec2 = Vec2::new(280.0, 64.0);
const SCREEN_MARGIN: f32 = 16.0;

/// Tracks dropdown picks so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectorInputState {
    selection_latched: Option<usize>,
}

impl SelectorInputState {
    /// Returns the latched selection, clearing it so the pick is delivered once.
    pub fn take_selection(&mut self) -> Option<usize> {
        self.selection_latched.take()
    }

    /// Records that the dropdown changed to `index` this frame.
    ///
    /// A later pick within the same frame replaces an earlier one.
    pub fn register_selection(&mut self, index: usize) {
        self.selection_latched = Some(index);
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `C` reveals the collision overlay.
    debug_pressed: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            debug_pressed: is_key_pressed(KeyCode::C),
        }
    }
}

fn poll_directional() -> DirectionalInput {
    DirectionalInput::new(
        is_key_down(KeyCode::Up),
        is_key_down(KeyCode::Down),
        is_key_down(KeyCode::Left),
        is_key_down(KeyCode::Right),
    )
}

fn gather_frame_input(
    directional: DirectionalInput,
    keyboard: KeyboardShortcuts,
    selector: &mut SelectorInputState,
) -> FrameInput {
    FrameInput {
        directional,
        debug_pressed: keyboard.debug_pressed,
        character_selection: selector.take_selection(),
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average once one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<C, B, F>(
        self,
        presentation: Presentation,
        build_scene: B,
        mut update_scene: F,
    ) -> Result<()>
    where
        C: 'static,
        B: FnOnce(LoadedAssets) -> Result<(Scene, C)> + 'static,
        F: FnMut(&mut C, Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            window_size,
            assets,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.0).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_size.1).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let loaded = SceneTextures::load(&assets).await;
            let (textures, mut scene, mut context) =
                match loaded.and_then(|(textures, text)| {
                    build_scene(text).map(|(scene, context)| (textures, scene, context))
                }) {
                    Ok(ready) => ready,
                    Err(error) => {
                        let _ = init_sender.send(Err(error));
                        return;
                    }
                };
            let _ = init_sender.send(Ok(()));

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut selector_input = SelectorInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    log::info!("quit requested");
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input =
                    gather_frame_input(poll_directional(), keyboard, &mut selector_input);
                update_scene(&mut context, frame_dt, frame_input, &mut scene);

                macroquad::window::clear_background(background);
                let viewport = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let origin =
                    camera_origin(scene.player.position, viewport, scene.map_size).round();

                for item in scene.draw_order() {
                    match item {
                        DrawItem::Layer(layer) => draw_layer(layer, &textures, origin, viewport),
                        DrawItem::Player => draw_player(&scene, &textures, origin),
                    }
                }
                if let Some(overlay) = &scene.debug_overlay {
                    draw_debug_overlay(overlay, origin, viewport);
                }

                {
                    let mut root_ui = macroquad::ui::root_ui();
                    draw_hud_ui(
                        &mut root_ui,
                        HudUiContext {
                            origin: MacroquadVec2::new(scene.hud.position.x, scene.hud.position.y),
                            text: &scene.hud.text,
                        },
                    );
                    let labels: Vec<&str> =
                        scene.selector.labels.iter().map(String::as_str).collect();
                    let picked = draw_selector_ui(
                        &mut root_ui,
                        SelectorUiContext {
                            origin: MacroquadVec2::new(
                                viewport.x - SELECTOR_SIZE.x - SCREEN_MARGIN,
                                SCREEN_MARGIN,
                            ),
                            size: MacroquadVec2::new(SELECTOR_SIZE.x, SELECTOR_SIZE.y),
                            labels: &labels,
                            selected: scene.selector.selected,
                        },
                    );
                    if let Some(index) = picked {
                        selector_input.register_selection(index);
                    }
                }

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        log::info!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_layer(layer: &SceneLayer, textures: &SceneTextures, origin: Vec2, viewport: Vec2) {
    if layer.opacity <= 0.0 {
        return;
    }
    for tile in &layer.tiles {
        let destination = tile.destination.relative_to(origin);
        if !is_visible(destination, viewport) {
            continue;
        }
        if let Err(error) =
            textures.draw_region(TextureRole::Tileset, tile.source, destination, layer.opacity)
        {
            log::warn!("failed to draw layer `{}`: {error:#}", layer.name);
            return;
        }
    }
}

fn draw_player(scene: &Scene, textures: &SceneTextures, origin: Vec2) {
    let Some(frame) = scene.animations.frame(scene.player.animation.current_frame()) else {
        return;
    };
    let Some(destination) = scene.player.destination(&scene.animations) else {
        return;
    };
    if let Err(error) = textures.draw_region(
        TextureRole::SpriteSheet,
        frame.source.into(),
        destination.relative_to(origin),
        1.0,
    ) {
        log::warn!("failed to draw player: {error:#}");
    }
}

fn draw_debug_overlay(overlay: &DebugOverlay, origin: Vec2, viewport: Vec2) {
    let fill = to_macroquad_color(overlay.tile_fill);
    for tile in &overlay.solid_tiles {
        let rect = tile.relative_to(origin);
        if is_visible(rect, viewport) {
            macroquad::shapes::draw_rectangle(rect.x, rect.y, rect.width, rect.height, fill);
        }
    }

    let face = to_macroquad_color(overlay.face_color);
    for segment in &overlay.faces {
        let start = segment.start - origin;
        let end = segment.end - origin;
        macroquad::shapes::draw_line(start.x, start.y, end.x, end.y, 1.0, face);
    }

    let body = overlay.body.relative_to(origin);
    macroquad::shapes::draw_rectangle_lines(
        body.x,
        body.y,
        body.width,
        body.height,
        1.0,
        to_macroquad_color(overlay.body_color),
    );
}

fn to_macroquad_color(color: cypher_town_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
