#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Cypher Town adapters.

use anyhow::Result as AnyResult;
use cypher_town_core::DirectionalInput;
use cypher_town_world::{AnimationLibrary, AnimationPlayer, PixelRect};
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;

pub use cypher_town_core::{AssetRequests, LoadedAssets};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Axis-aligned rectangle in pixels, anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the rectangle moved by `-origin`, converting world space into view space.
    #[must_use]
    pub fn relative_to(self, origin: Vec2) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..self
        }
    }
}

impl From<PixelRect> for Rect {
    fn from(rect: PixelRect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Straight line between two points in map pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Arrow keys held during this frame.
    pub directional: DirectionalInput,
    /// Whether the debug key went down during this frame.
    pub debug_pressed: bool,
    /// Option picked in the character selector during this frame, if any.
    pub character_selection: Option<usize>,
}

/// One tile drawn from the tileset texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Destination in map pixels.
    pub destination: Rect,
    /// Source region in the tileset texture.
    pub source: Rect,
}

/// Visible tile layer with its draw depth.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayer {
    /// Layer name as authored in the map.
    pub name: String,
    /// Depth used to order the layer against the player.
    pub depth: i32,
    /// Opacity in the range 0.0..=1.0 applied to every tile of the layer.
    pub opacity: f32,
    /// Non-empty tiles of the layer.
    pub tiles: Vec<SceneTile>,
}

/// Player sprite state consumed by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSprite {
    /// Sprite centre in map pixels.
    pub position: Vec2,
    /// Display scale applied to the frame.
    pub scale: f32,
    /// Depth used to order the sprite against layers.
    pub depth: i32,
    /// Playback cursor over the character's animation library.
    pub animation: AnimationPlayer,
}

impl PlayerSprite {
    /// Destination rectangle of the current frame in map pixels.
    #[must_use]
    pub fn destination(&self, library: &AnimationLibrary) -> Option<Rect> {
        let frame = library.frame(self.animation.current_frame())?;
        let width = frame.source.width * self.scale;
        let height = frame.source.height * self.scale;
        Some(Rect::new(
            self.position.x - width * 0.5,
            self.position.y - height * 0.5,
            width,
            height,
        ))
    }
}

/// Collision diagnostics revealed by the debug key.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugOverlay {
    /// Fill used for colliding tiles.
    pub tile_fill: Color,
    /// Stroke used for interesting tile faces.
    pub face_color: Color,
    /// Stroke used for the player's physics body.
    pub body_color: Color,
    /// Colliding tiles in map pixels.
    pub solid_tiles: Vec<Rect>,
    /// Tile faces that border open space.
    pub faces: Vec<Segment>,
    /// Player physics body in map pixels.
    pub body: Rect,
}

impl DebugOverlay {
    /// Opacity of the whole overlay.
    pub const ALPHA: f32 = 0.75;
    /// Fill for colliding tiles.
    pub const TILE_FILL: Color = Color::from_rgb_u8(243, 134, 48).with_alpha(Self::ALPHA);
    /// Stroke for tile faces.
    pub const FACE_COLOR: Color = Color::from_rgb_u8(40, 39, 37).with_alpha(Self::ALPHA);
    /// Stroke for the physics body.
    pub const BODY_COLOR: Color = Color::from_rgb_u8(255, 0, 255);

    /// Creates an overlay with the standard palette.
    #[must_use]
    pub fn new(solid_tiles: Vec<Rect>, faces: Vec<Segment>, body: Rect) -> Self {
        Self {
            tile_fill: Self::TILE_FILL,
            face_color: Self::FACE_COLOR,
            body_color: Self::BODY_COLOR,
            solid_tiles,
            faces,
            body,
        }
    }
}

/// Instruction text pinned to the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Lines of text.
    pub text: String,
    /// Top-left corner in screen pixels.
    pub position: Vec2,
}

/// State of the character dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorView {
    /// Labels in presentation order.
    pub labels: Vec<String>,
    /// Option currently shown as selected.
    pub selected: usize,
}

/// Declarative scene description consumed by rendering adapters.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Map size in pixels.
    pub map_size: Vec2,
    /// Tile layers in authoring order.
    pub layers: Vec<SceneLayer>,
    /// Decoded animations for the player's sprite sheet.
    pub animations: AnimationLibrary,
    /// Player sprite.
    pub player: PlayerSprite,
    /// Collision diagnostics, present once the debug key fired.
    pub debug_overlay: Option<DebugOverlay>,
    /// Screen-pinned instructions.
    pub hud: Hud,
    /// Character dropdown.
    pub selector: SelectorView,
}

/// Item in the back-to-front draw list of a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawItem<'a> {
    /// Tile layer.
    Layer(&'a SceneLayer),
    /// Player sprite.
    Player,
}

impl Scene {
    /// Returns layers and the player ordered back to front.
    ///
    /// Layers are ordered by depth, keeping authoring order for equal depths.
    /// The player is drawn after every layer whose depth does not exceed its own.
    #[must_use]
    pub fn draw_order(&self) -> Vec<DrawItem<'_>> {
        let mut layers: Vec<&SceneLayer> = self.layers.iter().collect();
        layers.sort_by_key(|layer| layer.depth);

        let split = layers.partition_point(|layer| layer.depth <= self.player.depth);
        let mut items = Vec::with_capacity(layers.len() + 1);
        items.extend(layers[..split].iter().copied().map(DrawItem::Layer));
        items.push(DrawItem::Player);
        items.extend(layers[split..].iter().copied().map(DrawItem::Layer));
        items
    }
}

/// Returns the top-left corner of a view of size `viewport` that follows `target`.
///
/// The view stays inside the map; along an axis where the map is smaller than
/// the view, the map is centred instead.
#[must_use]
pub fn camera_origin(target: Vec2, viewport: Vec2, map_size: Vec2) -> Vec2 {
    Vec2::new(
        camera_axis(target.x, viewport.x, map_size.x),
        camera_axis(target.y, viewport.y, map_size.y),
    )
}

fn camera_axis(target: f32, view: f32, map: f32) -> f32 {
    if map <= view {
        (map - view) * 0.5
    } else {
        (target - view * 0.5).clamp(0.0, map - view)
    }
}

/// Window-level configuration handed to a backend.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title used for the window.
    pub window_title: String,
    /// Color used when clearing each frame.
    pub clear_color: Color,
    /// Initial window size in pixels.
    pub window_size: (u32, u32),
    /// Assets loaded before the scene is built.
    pub assets: AssetRequests,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        window_size: (u32, u32),
        assets: AssetRequests,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            window_size,
            assets,
        }
    }
}

/// Rendering backend capable of presenting Cypher Town scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// Every asset named by the presentation is loaded first. `build_scene`
    /// then runs once with the loaded text assets and returns the scene along
    /// with the context owned by the frame loop. `update_scene` runs every
    /// frame with that context, the frame delta and the captured input, and
    /// may mutate the scene before it is rendered.
    fn run<C, B, F>(
        self,
        presentation: Presentation,
        build_scene: B,
        update_scene: F,
    ) -> AnyResult<()>
    where
        C: 'static,
        B: FnOnce(LoadedAssets) -> AnyResult<(Scene, C)> + 'static,
        F: FnMut(&mut C, Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The window must have a visible area.
    #[error("window size must be positive (received {width}x{height})")]
    InvalidWindowSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Checks that a window size has a visible area.
pub fn validate_window_size(width: u32, height: u32) -> Result<(u32, u32), RenderingError> {
    if width == 0 || height == 0 {
        return Err(RenderingError::InvalidWindowSize { width, height });
    }
    Ok((width, height))
}
