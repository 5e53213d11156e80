//! Core viewport newtypes

/// Ratio of CSS display pixels to reference render pixels.
///
/// Maps boxes from the resolver's reference scale onto the page canvas as laid
/// out on screen. Independent of the device pixel ratio, which only affects the
/// canvas backing store.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DisplayScale(f64);

impl DisplayScale {
    /// One reference pixel per CSS pixel.
    pub const IDENTITY: Self = Self(1.0);

    /// Smart constructor: `css_display_width / reference_render_width`.
    ///
    /// Returns `None` unless both widths are finite and strictly positive.
    pub fn new(css_display_width: f64, reference_render_width: f64) -> Option<Self> {
        let valid = |w: f64| w.is_finite() && w > 0.0;
        if valid(css_display_width) && valid(reference_render_width) {
            Some(Self(css_display_width / reference_render_width))
        } else {
            None
        }
    }

    /// Get the raw factor.
    pub fn get(&self) -> f64 {
        self.0
    }

    /// Scale a reference-space length into CSS pixels.
    pub fn apply(&self, value: f64) -> f64 {
        value * self.0
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Device pixels per CSS pixel.
///
/// # Invariants
/// - Finite and strictly positive; anything else falls back to 1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DevicePixelRatio(f64);

impl DevicePixelRatio {
    /// Ratio of a standard-density display.
    pub const STANDARD: Self = Self(1.0);

    /// Smart constructor that falls back to [`Self::STANDARD`] for unusable ratios.
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            Self(ratio)
        } else {
            Self::STANDARD
        }
    }

    /// Raw ratio.
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for DevicePixelRatio {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Vertical or horizontal scroll position in CSS pixels. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ScrollOffset(f64);

impl ScrollOffset {
    /// Top or left edge.
    pub const ZERO: Self = Self(0.0);

    /// Clamp `value` to `>= 0`; NaN maps to zero.
    pub fn clamped(value: f64) -> Self {
        if value > 0.0 {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    /// Clamp `value` into `[0, max]`; NaN maps to zero.
    pub fn clamped_to(value: f64, max: f64) -> Self {
        let max = if max > 0.0 { max } else { 0.0 };
        if value > 0.0 {
            Self(value.min(max))
        } else {
            Self::ZERO
        }
    }

    /// Offset in CSS pixels.
    pub fn get(&self) -> f64 {
        self.0
    }
}
