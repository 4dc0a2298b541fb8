//! Sprite-sheet animation component.
//!
//! A [`SheetAnimation`] moves a frame rectangle across a bitmap, one frame
//! size at a time, along a single axis. It is owned by exactly one sprite
//! instance and advanced once per update sweep by
//! [`animation`](crate::systems::animation::animation).
//!
//! # Tick flow
//!
//! 1. Paused or exhausted animations do nothing.
//! 2. `frame_counter` throttles movement to one step every `frames_per_step` ticks.
//! 3. The cursor moves by one frame in `direction_sign`.
//! 4. In alternate mode the sign flips at the bounds; otherwise the cursor wraps.
//! 5. Each wrap or bounce is a boundary completion, counted against `iterations`.
//!
//! Options can be built in code with the `with_*` methods or parsed from JSON
//! through [`AnimationOptions`], which also accepts the legacy key names.

use std::fmt;
use std::num::NonZeroU32;

use bevy_ecs::prelude::Component;
use log::warn;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SpriteError};

/// Default throttle when none is configured.
pub const DEFAULT_FRAMES_PER_STEP: u32 = 12;

fn clamp_to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Axis and sense of travel of the frame cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Direction {
    /// Parse `ltr`, `rtl`, `ttb` or `btt`.
    ///
    /// The old spellings (`left2right`, ...) are still accepted and logged as
    /// deprecated.
    pub fn parse(value: &str) -> Result<Self> {
        let direction = match value {
            "ltr" => Direction::LeftToRight,
            "rtl" => Direction::RightToLeft,
            "ttb" => Direction::TopToBottom,
            "btt" => Direction::BottomToTop,
            legacy => {
                let direction = match legacy {
                    "left2right" => Direction::LeftToRight,
                    "right2left" => Direction::RightToLeft,
                    "top2bottom" => Direction::TopToBottom,
                    "bottom2top" => Direction::BottomToTop,
                    unknown => {
                        return Err(SpriteError::InvalidArgument(format!(
                            "unknown animation direction '{}'",
                            unknown
                        )));
                    }
                };
                warn!(
                    "Animation direction '{}' is deprecated, use '{}' instead",
                    legacy,
                    direction.as_str()
                );
                direction
            }
        };
        Ok(direction)
    }

    /// Canonical short name.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::LeftToRight => "ltr",
            Direction::RightToLeft => "rtl",
            Direction::TopToBottom => "ttb",
            Direction::BottomToTop => "btt",
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::RightToLeft)
    }

    /// True for ltr and ttb, which wrap back to the start bound.
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::TopToBottom)
    }

    /// Initial cursor multiplier: -1 for rtl/btt, +1 otherwise.
    pub fn sign(self) -> i32 {
        if self.is_forward() { 1 } else { -1 }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many boundary completions an animation lives for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Iterations {
    #[default]
    Unbounded,
    Limited(NonZeroU32),
}

impl Iterations {
    /// `Limited(n)`, or `Unbounded` when `n` is zero.
    pub fn limited(n: u32) -> Self {
        NonZeroU32::new(n).map_or(Iterations::Unbounded, Iterations::Limited)
    }
}

impl Serialize for Iterations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Iterations::Unbounded => serializer.serialize_str("unbounded"),
            Iterations::Limited(n) => serializer.serialize_u32(n.get()),
        }
    }
}

impl<'de> Deserialize<'de> for Iterations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(i64),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) if n > 0 => u32::try_from(n)
                .map(Iterations::limited)
                .map_err(|_| de::Error::custom(format!("iterations out of range: {}", n))),
            Raw::Count(n) => Err(de::Error::custom(format!(
                "iterations must be positive, got {}",
                n
            ))),
            Raw::Keyword(k) if k == "unbounded" || k == "infinite" => Ok(Iterations::Unbounded),
            Raw::Keyword(k) => Err(de::Error::custom(format!("unknown iterations value '{}'", k))),
        }
    }
}

/// Loosely typed animation options, as found in JSON sprite descriptions.
///
/// Every field is optional. Legacy key names (`animDirection`, `animByFrame`,
/// `pauseAnimation`) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationOptions {
    pub sx: i32,
    pub sy: i32,
    pub s_width: i32,
    pub s_height: i32,
    #[serde(alias = "animDirection", skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub alternate: bool,
    #[serde(alias = "animByFrame", skip_serializing_if = "Option::is_none")]
    pub frames_per_step: Option<i64>,
    #[serde(alias = "pauseAnimation")]
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<Iterations>,
    pub start_point: i32,
    pub end_point: i32,
}

impl AnimationOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of one tick of [`SheetAnimation::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Paused or already exhausted; nothing changed.
    Idle,
    /// Throttle counted a tick but the cursor did not move.
    Waiting,
    /// The cursor moved one frame.
    Moved,
    /// The cursor moved and a wrap or bounce completed.
    Completed,
    /// The iteration limit was reached on this tick. The animation is dead.
    Exhausted,
}

/// Per-instance sprite-sheet animation state.
#[derive(Debug, Clone, Component, PartialEq)]
pub struct SheetAnimation {
    pub sx: i32,
    pub sy: i32,
    frame_width: i32,
    frame_height: i32,
    direction: Direction,
    direction_sign: i32,
    pub alternate: bool,
    frames_per_step: u32,
    frame_counter: u32,
    pub paused: bool,
    iterations: Iterations,
    iteration_count: u32,
    start_point: i32,
    end_point: i32,
    reset_pending: bool,
    exhausted: bool,
    origin_set: bool,
}

impl Default for SheetAnimation {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl SheetAnimation {
    /// Frames of `frame_width` x `frame_height` pixels, moving left to right.
    ///
    /// A zero dimension means "the whole bitmap" and is filled in when the
    /// animation is attached to an instance.
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            sx: 0,
            sy: 0,
            frame_width: clamp_to_i32(frame_width),
            frame_height: clamp_to_i32(frame_height),
            direction: Direction::LeftToRight,
            direction_sign: 1,
            alternate: false,
            frames_per_step: DEFAULT_FRAMES_PER_STEP,
            frame_counter: 0,
            paused: false,
            iterations: Iterations::Unbounded,
            iteration_count: 0,
            start_point: 0,
            end_point: 0,
            reset_pending: false,
            exhausted: false,
            origin_set: false,
        }
    }

    /// Build from parsed options. `default_frames_per_step` is used when the
    /// options leave the throttle unset.
    pub fn from_options(options: &AnimationOptions, default_frames_per_step: u32) -> Result<Self> {
        if options.s_width < 0 || options.s_height < 0 {
            return Err(SpriteError::InvalidArgument(format!(
                "frame size must not be negative, got {}x{}",
                options.s_width, options.s_height
            )));
        }
        let frames_per_step = match options.frames_per_step {
            None => default_frames_per_step.max(1),
            Some(n) if n > 0 => u32::try_from(n).map_err(|_| {
                SpriteError::InvalidArgument(format!("framesPerStep out of range: {}", n))
            })?,
            Some(n) => {
                return Err(SpriteError::InvalidArgument(format!(
                    "framesPerStep must be positive, got {}",
                    n
                )));
            }
        };
        let direction = match options.direction.as_deref() {
            Some(value) => Direction::parse(value)?,
            None => Direction::LeftToRight,
        };

        let mut anim = Self::new(options.s_width as u32, options.s_height as u32)
            .with_direction(direction)
            .with_alternate(options.alternate)
            .with_frames_per_step(frames_per_step)
            .with_iterations(options.iterations.unwrap_or_default())
            .with_bounds(options.start_point, options.end_point);
        if options.sx > 0 || options.sy > 0 {
            anim = anim.with_origin(options.sx.max(0), options.sy.max(0));
        }
        anim.paused = options.paused;
        Ok(anim)
    }

    /// Parse JSON options and build the animation in one go.
    pub fn from_json(json: &str, default_frames_per_step: u32) -> Result<Self> {
        Self::from_options(&AnimationOptions::from_json(json)?, default_frames_per_step)
    }

    /// Explicit starting cursor. Bouncing backward animations with no origin
    /// start on the last frame instead of 0.
    pub fn with_origin(mut self, sx: i32, sy: i32) -> Self {
        self.sx = sx;
        self.sy = sy;
        self.origin_set = true;
        self.apply_start_point();
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self.direction_sign = direction.sign();
        self.apply_start_point();
        self
    }

    pub fn with_alternate(mut self, alternate: bool) -> Self {
        self.alternate = alternate;
        self
    }

    /// Advance once every `n` ticks. Zero is clamped to 1.
    pub fn with_frames_per_step(mut self, n: u32) -> Self {
        if n == 0 {
            warn!("framesPerStep of 0 clamped to 1");
        }
        self.frames_per_step = n.max(1);
        self
    }

    pub fn with_iterations(mut self, iterations: Iterations) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Restrict travel to `[start, end)` on the animated axis. Zero leaves a
    /// bound unset. A positive start also becomes the initial cursor.
    pub fn with_bounds(mut self, start: i32, end: i32) -> Self {
        self.start_point = start.max(0);
        self.end_point = end.max(0);
        self.apply_start_point();
        self
    }

    fn apply_start_point(&mut self) {
        if self.start_point > 0 {
            if self.direction.is_horizontal() {
                self.sx = self.start_point;
            } else {
                self.sy = self.start_point;
            }
        }
    }

    pub fn frame_width(&self) -> i32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> i32 {
        self.frame_height
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn direction_sign(&self) -> i32 {
        self.direction_sign
    }

    pub fn frames_per_step(&self) -> u32 {
        self.frames_per_step
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn iterations(&self) -> Iterations {
        self.iterations
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn start_point(&self) -> i32 {
        self.start_point
    }

    pub fn end_point(&self) -> i32 {
        self.end_point
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fit the animation to the bitmap it will run on. Zero frame dimensions
    /// take the bitmap's size, and a bouncing backward animation without an
    /// explicit origin or start point is placed on its last frame.
    ///
    /// Attaching through the manager does this; call it directly when driving
    /// [`advance`](Self::advance) by hand.
    pub fn fit_to_sheet(&mut self, sheet_width: u32, sheet_height: u32) {
        if self.frame_width == 0 {
            self.frame_width = clamp_to_i32(sheet_width);
        }
        if self.frame_height == 0 {
            self.frame_height = clamp_to_i32(sheet_height);
        }
        if self.alternate
            && !self.direction.is_forward()
            && !self.origin_set
            && self.start_point == 0
        {
            let horizontal = self.direction.is_horizontal();
            let (frame, extent) = if horizontal {
                (self.frame_width, clamp_to_i32(sheet_width))
            } else {
                (self.frame_height, clamp_to_i32(sheet_height))
            };
            let end = if self.end_point > 0 {
                self.end_point
            } else {
                extent
            };
            let last = end.saturating_sub(frame).max(0);
            if horizontal {
                self.sx = last;
            } else {
                self.sy = last;
            }
        }
    }

    /// Run one tick against a bitmap of `sheet_width` x `sheet_height` pixels.
    pub fn advance(&mut self, sheet_width: i32, sheet_height: i32) -> Step {
        if self.paused || self.exhausted {
            return Step::Idle;
        }

        self.frame_counter += 1;
        if self.frame_counter < self.frames_per_step {
            return Step::Waiting;
        }
        self.frame_counter = 0;

        // The bounce detected on the previous step completes now, after its
        // frame has been on screen for one step.
        let mut boundary = std::mem::take(&mut self.reset_pending);

        let horizontal = self.direction.is_horizontal();
        let (frame, extent) = if horizontal {
            (self.frame_width, sheet_width)
        } else {
            (self.frame_height, sheet_height)
        };
        let start = self.start_point;
        let end = if self.end_point > 0 {
            self.end_point
        } else {
            extent
        };

        let mut cursor = if horizontal { self.sx } else { self.sy };
        cursor = cursor.saturating_add(frame.saturating_mul(self.direction_sign));

        if self.alternate {
            if cursor <= start || cursor.saturating_add(frame) >= end {
                self.direction_sign = -self.direction_sign;
                self.reset_pending = true;
            }
        } else if self.direction.is_forward() {
            if cursor >= end {
                cursor = start;
                boundary = true;
            }
        } else if cursor < start {
            cursor = end.saturating_sub(frame);
            boundary = true;
        }

        if horizontal {
            self.sx = cursor;
        } else {
            self.sy = cursor;
        }

        if !boundary {
            return Step::Moved;
        }
        if let Iterations::Limited(limit) = self.iterations {
            self.iteration_count += 1;
            if self.iteration_count >= limit.get() {
                self.exhausted = true;
                return Step::Exhausted;
            }
        }
        Step::Completed
    }
}
