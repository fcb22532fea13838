//! Sprite-sheet animation decoded from Aseprite JSON exports.
//!
//! Frames keep the order in which the export lists them, because frame tags
//! address frames by position. Playback runs on integer microseconds so that
//! replays with identical frame deltas land on identical frames.

use std::{collections::HashMap, time::Duration};

use cypher_town_core::{AnimationNaming, Pose};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::tilemap::PixelRect;

/// Errors raised while decoding sprite-sheet metadata or driving playback.
#[derive(Debug, Error)]
pub enum AnimationError {
    /// The metadata is not valid Aseprite JSON.
    #[error("failed to parse sprite-sheet metadata: {0}")]
    Parse(#[from] serde_json::Error),
    /// The export does not contain any frame.
    #[error("sprite-sheet metadata lists no frames")]
    NoFrames,
    /// Two frames share the same name.
    #[error("frame `{name}` appears more than once")]
    DuplicateFrame {
        /// Repeated frame name.
        name: String,
    },
    /// A frame has no display time, which would stall playback.
    #[error("frame `{name}` has a zero duration")]
    ZeroDuration {
        /// Offending frame name.
        name: String,
    },
    /// A frame tag points past the end of the frame list.
    #[error("animation `{tag}` spans frames {from}..={to} but only {frames} frames exist")]
    TagOutOfRange {
        /// Tag name.
        tag: String,
        /// First frame index referenced by the tag.
        from: usize,
        /// Last frame index referenced by the tag.
        to: usize,
        /// Number of frames in the export.
        frames: usize,
    },
    /// A frame tag uses a playback direction that is not understood.
    #[error("animation `{tag}` uses unsupported direction `{direction}`")]
    UnknownDirection {
        /// Tag name.
        tag: String,
        /// Direction string found in the export.
        direction: String,
    },
    /// Playback was requested for an animation the library does not contain.
    #[error("unknown animation `{key}`")]
    UnknownAnimation {
        /// Requested animation key.
        key: String,
    },
    /// A static frame was requested that the library does not contain.
    #[error("unknown frame `{name}`")]
    UnknownFrame {
        /// Requested frame name.
        name: String,
    },
}

#[derive(Debug, Deserialize)]
struct AsepriteExport {
    frames: AsepriteFrames,
    #[serde(default)]
    meta: AsepriteMeta,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AsepriteFrames {
    Array(Vec<NamedFrame>),
    Hash(serde_json::Map<String, Value>),
}

#[derive(Debug, Deserialize)]
struct NamedFrame {
    filename: String,
    #[serde(flatten)]
    frame: AsepriteFrame,
}

#[derive(Debug, Deserialize)]
struct AsepriteFrame {
    frame: AsepriteRect,
    #[serde(default = "default_frame_duration")]
    duration: u32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct AsepriteRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Debug, Default, Deserialize)]
struct AsepriteMeta {
    #[serde(default, rename = "frameTags")]
    frame_tags: Vec<AsepriteTag>,
}

#[derive(Debug, Deserialize)]
struct AsepriteTag {
    name: String,
    from: usize,
    to: usize,
    #[serde(default = "default_direction")]
    direction: String,
}

const fn default_frame_duration() -> u32 {
    100
}

fn default_direction() -> String {
    "forward".to_owned()
}

/// Single frame of a sprite sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteFrame {
    /// Name used to show the frame statically.
    pub name: String,
    /// Region of the sprite-sheet texture, in texels.
    pub source: PixelRect,
    /// Display time while animating.
    pub duration: Duration,
}

/// Order in which a tag walks through its frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackDirection {
    /// From the first frame to the last.
    Forward,
    /// From the last frame to the first.
    Reverse,
    /// Forward, then back without repeating the end frames.
    PingPong,
    /// Reverse, then forward without repeating the end frames.
    PingPongReverse,
}

impl PlaybackDirection {
    fn parse(tag: &str, direction: &str) -> Result<Self, AnimationError> {
        match direction {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            "pingpong" => Ok(Self::PingPong),
            "pingpong_reverse" => Ok(Self::PingPongReverse),
            other => Err(AnimationError::UnknownDirection {
                tag: tag.to_owned(),
                direction: other.to_owned(),
            }),
        }
    }

    fn sequence(self, from: usize, to: usize) -> Vec<usize> {
        let forward: Vec<usize> = (from..=to).collect();
        let reverse: Vec<usize> = (from..=to).rev().collect();
        let inner = |frames: &[usize]| -> Vec<usize> {
            if frames.len() > 2 {
                frames[1..frames.len() - 1].iter().rev().copied().collect()
            } else {
                Vec::new()
            }
        };

        match self {
            Self::Forward => forward,
            Self::Reverse => reverse,
            Self::PingPong => {
                let back = inner(&forward);
                forward.into_iter().chain(back).collect()
            }
            Self::PingPongReverse => {
                let back = inner(&reverse);
                reverse.into_iter().chain(back).collect()
            }
        }
    }
}

/// Looping animation expressed as indices into the library's frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationClip {
    direction: PlaybackDirection,
    frames: Vec<usize>,
}

impl AnimationClip {
    /// Direction declared by the tag.
    #[must_use]
    pub const fn direction(&self) -> PlaybackDirection {
        self.direction
    }

    /// Frame indices visited during one loop.
    #[must_use]
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }
}

/// Frames and animations decoded from one character's sprite-sheet metadata.
#[derive(Clone, Debug)]
pub struct AnimationLibrary {
    frames: Vec<SpriteFrame>,
    frame_lookup: HashMap<String, usize>,
    clips: HashMap<String, AnimationClip>,
}

impl AnimationLibrary {
    /// Decodes an Aseprite export in either the hash or the array layout.
    pub fn from_aseprite_json(contents: &str) -> Result<Self, AnimationError> {
        let export: AsepriteExport = serde_json::from_str(contents)?;

        let named: Vec<(String, AsepriteFrame)> = match export.frames {
            AsepriteFrames::Array(frames) => frames
                .into_iter()
                .map(|named| (named.filename, named.frame))
                .collect(),
            AsepriteFrames::Hash(map) => map
                .into_iter()
                .map(|(name, value)| Ok((name, serde_json::from_value(value)?)))
                .collect::<Result<_, serde_json::Error>>()?,
        };

        if named.is_empty() {
            return Err(AnimationError::NoFrames);
        }

        let mut frames = Vec::with_capacity(named.len());
        let mut frame_lookup = HashMap::with_capacity(named.len());
        for (index, (name, frame)) in named.into_iter().enumerate() {
            if frame.duration == 0 {
                return Err(AnimationError::ZeroDuration { name });
            }
            if frame_lookup.insert(name.clone(), index).is_some() {
                return Err(AnimationError::DuplicateFrame { name });
            }
            frames.push(SpriteFrame {
                name,
                source: PixelRect::new(
                    frame.frame.x as f32,
                    frame.frame.y as f32,
                    frame.frame.w as f32,
                    frame.frame.h as f32,
                ),
                duration: Duration::from_millis(u64::from(frame.duration)),
            });
        }

        let mut clips = HashMap::with_capacity(export.meta.frame_tags.len());
        for tag in export.meta.frame_tags {
            if tag.from > tag.to || tag.to >= frames.len() {
                return Err(AnimationError::TagOutOfRange {
                    tag: tag.name,
                    from: tag.from,
                    to: tag.to,
                    frames: frames.len(),
                });
            }
            let direction = PlaybackDirection::parse(&tag.name, &tag.direction)?;
            let clip = AnimationClip {
                direction,
                frames: direction.sequence(tag.from, tag.to),
            };
            let _ = clips.insert(tag.name, clip);
        }

        Ok(Self {
            frames,
            frame_lookup,
            clips,
        })
    }

    /// Number of frames in the sheet.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame at the given position.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&SpriteFrame> {
        self.frames.get(index)
    }

    /// Position of the frame with the given name.
    #[must_use]
    pub fn frame_index(&self, name: &str) -> Option<usize> {
        self.frame_lookup.get(name).copied()
    }

    /// Size of the first frame in texels, used as the sprite's unscaled size.
    #[must_use]
    pub fn frame_size(&self) -> (f32, f32) {
        self.frames
            .first()
            .map_or((0.0, 0.0), |frame| (frame.source.width, frame.source.height))
    }

    /// Animation registered under `key`.
    #[must_use]
    pub fn clip(&self, key: &str) -> Option<&AnimationClip> {
        self.clips.get(key)
    }
}

/// Animation instruction derived from the player's pose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoseRequest {
    /// Play the named animation, keeping progress when it already runs.
    Play(String),
    /// Stop playback and show the named frame.
    Show(String),
    /// Stop playback and keep the current frame.
    Hold,
}

impl PoseRequest {
    /// Translates a pose through the character's naming convention.
    #[must_use]
    pub fn from_pose(pose: Pose, naming: &AnimationNaming) -> Self {
        match pose {
            Pose::Walking(facing) => Self::Play(naming.walk_key(facing).to_owned()),
            Pose::Idle(facing) => Self::Show(naming.idle_frame(facing).to_owned()),
            Pose::Unchanged => Self::Hold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Playback {
    key: String,
    step: usize,
    elapsed_us: u128,
}

/// Playback cursor for a single sprite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationPlayer {
    frame: usize,
    playback: Option<Playback>,
}

impl AnimationPlayer {
    /// Creates a stopped player showing the frame at `frame`.
    #[must_use]
    pub const fn new(frame: usize) -> Self {
        Self {
            frame,
            playback: None,
        }
    }

    /// Frame currently displayed.
    #[must_use]
    pub const fn current_frame(&self) -> usize {
        self.frame
    }

    /// Key of the animation being played, if any.
    #[must_use]
    pub fn current_animation(&self) -> Option<&str> {
        self.playback.as_ref().map(|playback| playback.key.as_str())
    }

    /// Reports whether an animation is running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Applies a pose request.
    ///
    /// Playing the animation that is already running keeps its progress.
    /// Showing a frame or holding stops playback.
    pub fn request(
        &mut self,
        request: &PoseRequest,
        library: &AnimationLibrary,
    ) -> Result<(), AnimationError> {
        match request {
            PoseRequest::Play(key) => {
                if self.current_animation() == Some(key.as_str()) {
                    return Ok(());
                }
                let clip = library
                    .clip(key)
                    .ok_or_else(|| AnimationError::UnknownAnimation { key: key.clone() })?;
                self.frame = clip.frames[0];
                self.playback = Some(Playback {
                    key: key.clone(),
                    step: 0,
                    elapsed_us: 0,
                });
            }
            PoseRequest::Show(name) => {
                let frame = library
                    .frame_index(name)
                    .ok_or_else(|| AnimationError::UnknownFrame { name: name.clone() })?;
                self.frame = frame;
                self.playback = None;
            }
            PoseRequest::Hold => self.playback = None,
        }
        Ok(())
    }

    /// Advances the running animation by `dt`, looping at the end of the clip.
    pub fn advance(&mut self, dt: Duration, library: &AnimationLibrary) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let Some(clip) = library.clip(&playback.key) else {
            self.playback = None;
            return;
        };

        playback.elapsed_us += dt.as_micros();
        loop {
            let frame = clip.frames[playback.step];
            let duration = library.frames[frame].duration.as_micros();
            if playback.elapsed_us < duration {
                break;
            }
            playback.elapsed_us -= duration;
            playback.step = (playback.step + 1) % clip.frames.len();
        }
        self.frame = clip.frames[playback.step];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cypher_town_core::{Facing, NamingPreset};

    #[test]
    fn pose_requests_follow_naming_convention() {
        let naming = AnimationNaming::from_preset(NamingPreset::Screen);

        assert_eq!(
            PoseRequest::from_pose(Pose::Walking(Facing::Up), &naming),
            PoseRequest::Play("walking up".to_owned())
        );
        assert_eq!(
            PoseRequest::from_pose(Pose::Idle(Facing::Right), &naming),
            PoseRequest::Show("12".to_owned())
        );
        assert_eq!(PoseRequest::from_pose(Pose::Unchanged, &naming), PoseRequest::Hold);
    }

    #[test]
    fn pingpong_does_not_repeat_end_frames() {
        assert_eq!(PlaybackDirection::PingPong.sequence(2, 5), vec![2, 3, 4, 5, 4, 3]);
        assert_eq!(PlaybackDirection::PingPong.sequence(0, 1), vec![0, 1]);
        assert_eq!(
            PlaybackDirection::PingPongReverse.sequence(0, 2),
            vec![2, 1, 0, 1]
        );
        assert_eq!(PlaybackDirection::Reverse.sequence(3, 3), vec![3]);
    }

    #[test]
    fn rejects_unknown_direction() {
        let json = r#"{
            "frames": [{ "filename": "0", "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 100 }],
            "meta": { "frameTags": [{ "name": "spin", "from": 0, "to": 0, "direction": "sideways" }] }
        }"#;

        assert!(matches!(
            AnimationLibrary::from_aseprite_json(json),
            Err(AnimationError::UnknownDirection { .. })
        ));
    }

    #[test]
    fn rejects_zero_duration_frames() {
        let json = r#"{ "frames": { "0": { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 0 } } }"#;

        assert!(matches!(
            AnimationLibrary::from_aseprite_json(json),
            Err(AnimationError::ZeroDuration { .. })
        ));
    }
}
