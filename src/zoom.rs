//! Zoom level for the diagram view.
//!
//! The scale lives on a fixed grid of 0.2 steps between 0.4 and 2.0. It is
//! stored as an integer step count so comparisons against 1.0 are exact.

use std::fmt;
use std::str::FromStr;

const STEP: f32 = 0.2;
const MIN_STEPS: u8 = 2;
const MAX_STEPS: u8 = 10;
const DEFAULT_STEPS: u8 = 5;

/// A zoom level on the 0.4..=2.0 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zoom(u8);

impl Zoom {
    pub const MIN: Self = Self(MIN_STEPS);
    pub const MAX: Self = Self(MAX_STEPS);
    pub const DEFAULT: Self = Self(DEFAULT_STEPS);

    /// Snap an arbitrary scale to the nearest grid value, clamped to range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_scale(scale: f32) -> Self {
        if !scale.is_finite() {
            return Self::DEFAULT;
        }
        let steps = (scale / STEP).round().clamp(f32::from(MIN_STEPS), f32::from(MAX_STEPS));
        // Clamped to 2..=10 above.
        Self(steps as u8)
    }

    /// The scale factor applied to the diagram.
    pub fn scale(self) -> f32 {
        f32::from(self.0) * STEP
    }

    /// Scale in whole percent (e.g. 140 for 1.4).
    pub fn percent(self) -> u16 {
        u16::from(self.0) * 20
    }

    #[must_use]
    pub fn zoom_in(self) -> Self {
        Self((self.0 + 1).min(MAX_STEPS))
    }

    #[must_use]
    pub fn zoom_out(self) -> Self {
        Self(self.0.saturating_sub(1).max(MIN_STEPS))
    }

    #[must_use]
    pub const fn reset() -> Self {
        Self::DEFAULT
    }

    pub const fn can_zoom_in(self) -> bool {
        self.0 < MAX_STEPS
    }

    pub const fn can_zoom_out(self) -> bool {
        self.0 > MIN_STEPS
    }

    /// True at exactly 1.0.
    pub const fn is_default(self) -> bool {
        self.0 == DEFAULT_STEPS
    }

    /// CSS number for the scale, e.g. `1.4` or `0.6`.
    pub fn css_value(self) -> String {
        let tenths = u16::from(self.0) * 2;
        if tenths % 10 == 0 {
            format!("{}", tenths / 10)
        } else {
            format!("{}.{}", tenths / 10, tenths % 10)
        }
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid zoom scale '{0}' (expected a number such as 1.4 or 140%)")]
pub struct ZoomParseError(String);

impl FromStr for Zoom {
    type Err = ZoomParseError;

    /// Accepts `1.4` or `140%`. Values are snapped to the grid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let scale = if let Some(pct) = trimmed.strip_suffix('%') {
            pct.trim().parse::<f32>().map(|p| p / 100.0)
        } else {
            trimmed.parse::<f32>()
        }
        .map_err(|_| ZoomParseError(s.to_string()))?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ZoomParseError(s.to_string()));
        }
        Ok(Self::from_scale(scale))
    }
}
