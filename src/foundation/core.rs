use std::ops::{BitAnd, BitOr};

/// One straight-alpha float sample in `R, G, B, A` order.
///
/// Alpha is in `[0, 1]`. The color channels only carry meaning while `a > 0`; a transparent
/// sample may hold anything in `r`, `g`, `b` (NaN included) and those values are never
/// trusted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pixel {
    /// Red (or L* for Lab data).
    pub r: f32,
    /// Green (or a* for Lab data).
    pub g: f32,
    /// Blue (or b* for Lab data).
    pub b: f32,
    /// Coverage in `[0, 1]`.
    pub a: f32,
}

impl Pixel {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Construct a sample from its four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color, different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// The three color channels.
    pub const fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a sample from color channels and an alpha.
    pub const fn from_rgb(rgb: [f32; 3], a: f32) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    /// Raw bit patterns of all four channels, for exact comparisons that treat NaN payloads
    /// as values.
    pub fn to_bits(self) -> [u32; 4] {
        [
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ]
    }
}

/// A concrete color space pixels can be blended or composited in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSpace {
    /// Linear light in the profile's primaries.
    RgbLinear,
    /// sRGB transfer curve over the profile's primaries.
    RgbPerceptual,
    /// The profile's own transfer curve.
    RgbNonLinear,
    /// CIE L*a*b* (D50).
    Lab,
}

impl ColorSpace {
    /// Number of concrete spaces.
    pub const COUNT: usize = 4;

    /// All concrete spaces in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::RgbLinear,
        Self::RgbPerceptual,
        Self::RgbNonLinear,
        Self::Lab,
    ];

    /// Zero-based position of this space in conversion tables.
    pub const fn index(self) -> usize {
        match self {
            Self::RgbLinear => 0,
            Self::RgbPerceptual => 1,
            Self::RgbNonLinear => 2,
            Self::Lab => 3,
        }
    }
}

/// Color space as configured on an operation; `Auto` defers to the mode registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerColorSpace {
    /// Use the mode's default.
    #[default]
    Auto,
    /// See [`ColorSpace::RgbLinear`].
    RgbLinear,
    /// See [`ColorSpace::RgbPerceptual`].
    RgbPerceptual,
    /// See [`ColorSpace::RgbNonLinear`].
    RgbNonLinear,
    /// See [`ColorSpace::Lab`].
    Lab,
}

impl LayerColorSpace {
    /// The concrete space, or `None` for `Auto`.
    pub const fn concrete(self) -> Option<ColorSpace> {
        match self {
            Self::Auto => None,
            Self::RgbLinear => Some(ColorSpace::RgbLinear),
            Self::RgbPerceptual => Some(ColorSpace::RgbPerceptual),
            Self::RgbNonLinear => Some(ColorSpace::RgbNonLinear),
            Self::Lab => Some(ColorSpace::Lab),
        }
    }

    /// `self` unless it is `Auto`, in which case `fallback`.
    pub const fn or(self, fallback: Self) -> Self {
        match self {
            Self::Auto => fallback,
            other => other,
        }
    }
}

impl From<ColorSpace> for LayerColorSpace {
    fn from(space: ColorSpace) -> Self {
        match space {
            ColorSpace::RgbLinear => Self::RgbLinear,
            ColorSpace::RgbPerceptual => Self::RgbPerceptual,
            ColorSpace::RgbNonLinear => Self::RgbNonLinear,
            ColorSpace::Lab => Self::Lab,
        }
    }
}

/// Which parts of the backdrop/layer coverage survive compositing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMode {
    /// Source-over: coverage of either input survives.
    Union,
    /// Source-atop: result is clipped to the backdrop's coverage.
    ClipToBackdrop,
    /// Destination-atop: result is clipped to the layer's coverage.
    ClipToLayer,
    /// Source-in: only the overlap survives.
    Intersection,
}

impl CompositeMode {
    /// All concrete modes in table order.
    pub const ALL: [Self; 4] = [
        Self::Union,
        Self::ClipToBackdrop,
        Self::ClipToLayer,
        Self::Intersection,
    ];

    /// Zero-based position of this mode in per-mode tables.
    pub const fn index(self) -> usize {
        match self {
            Self::Union => 0,
            Self::ClipToBackdrop => 1,
            Self::ClipToLayer => 2,
            Self::Intersection => 3,
        }
    }
}

/// Composite mode as configured on an operation; `Auto` defers to the mode registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerCompositeMode {
    /// Use the mode's default.
    #[default]
    Auto,
    /// See [`CompositeMode::Union`].
    Union,
    /// See [`CompositeMode::ClipToBackdrop`].
    ClipToBackdrop,
    /// See [`CompositeMode::ClipToLayer`].
    ClipToLayer,
    /// See [`CompositeMode::Intersection`].
    Intersection,
}

impl LayerCompositeMode {
    /// The concrete mode, or `None` for `Auto`.
    pub const fn concrete(self) -> Option<CompositeMode> {
        match self {
            Self::Auto => None,
            Self::Union => Some(CompositeMode::Union),
            Self::ClipToBackdrop => Some(CompositeMode::ClipToBackdrop),
            Self::ClipToLayer => Some(CompositeMode::ClipToLayer),
            Self::Intersection => Some(CompositeMode::Intersection),
        }
    }
}

impl From<CompositeMode> for LayerCompositeMode {
    fn from(mode: CompositeMode) -> Self {
        match mode {
            CompositeMode::Union => Self::Union,
            CompositeMode::ClipToBackdrop => Self::ClipToBackdrop,
            CompositeMode::ClipToLayer => Self::ClipToLayer,
            CompositeMode::Intersection => Self::Intersection,
        }
    }
}

/// A subset of `{Source, Destination}`; Source is the layer, Destination the backdrop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositeRegion(u8);

impl CompositeRegion {
    /// The empty set (the overlap only).
    pub const NONE: Self = Self(0);
    /// The layer.
    pub const SOURCE: Self = Self(1);
    /// The backdrop.
    pub const DESTINATION: Self = Self(2);
    /// Both inputs.
    pub const BOTH: Self = Self(3);

    /// `true` when every member of `other` is in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `self` with the members of `other` removed.
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// `true` for the empty set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CompositeRegion {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for CompositeRegion {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
