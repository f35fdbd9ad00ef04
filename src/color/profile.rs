use crate::foundation::core::ColorSpace;
use crate::foundation::error::{LayerModeError, LayerModeResult};

/// Row-major 3x3 matrix.
pub type Mat3 = [[f32; 3]; 3];

/// Transfer curve of an RGB profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trc {
    /// Values are linear light.
    Linear,
    /// The piecewise sRGB curve.
    Srgb,
    /// A pure power curve; encoded = linear^(1/g).
    Gamma(f32),
}

impl Trc {
    /// Encoded value to linear light. Negative input mirrors around zero.
    pub fn to_linear(self, v: f32) -> f32 {
        match self {
            Self::Linear => v,
            Self::Srgb => srgb_to_linear(v),
            Self::Gamma(g) => v.signum() * v.abs().powf(g),
        }
    }

    /// Linear light to encoded value. Negative input mirrors around zero.
    pub fn from_linear(self, v: f32) -> f32 {
        match self {
            Self::Linear => v,
            Self::Srgb => linear_to_srgb(v),
            Self::Gamma(g) => v.signum() * v.abs().powf(1.0 / g),
        }
    }
}

fn srgb_to_linear(v: f32) -> f32 {
    let a = v.abs();
    let lin = if a <= 0.040_45 {
        a / 12.92
    } else {
        ((a + 0.055) / 1.055).powf(2.4)
    };
    lin.copysign(v)
}

fn linear_to_srgb(v: f32) -> f32 {
    let a = v.abs();
    let enc = if a <= 0.003_130_8 {
        a * 12.92
    } else {
        1.055 * a.powf(1.0 / 2.4) - 0.055
    };
    enc.copysign(v)
}

/// An RGB working space: primaries (as a linear RGB to XYZ D50 matrix) plus a transfer
/// curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RgbProfile {
    to_xyz: Mat3,
    trc: Trc,
}

impl RgbProfile {
    /// sRGB primaries, Bradford-adapted to D50, with the sRGB curve.
    pub const fn srgb() -> Self {
        Self {
            to_xyz: [
                [0.436_074_7, 0.385_064_9, 0.143_080_4],
                [0.222_504_5, 0.716_878_6, 0.060_616_9],
                [0.013_932_2, 0.097_104_5, 0.714_173_3],
            ],
            trc: Trc::Srgb,
        }
    }

    /// A custom profile. Gamma exponents must be finite and positive.
    pub fn new(to_xyz: Mat3, trc: Trc) -> LayerModeResult<Self> {
        if let Trc::Gamma(g) = trc
            && !(g.is_finite() && g > 0.0)
        {
            return Err(LayerModeError::config(format!(
                "gamma exponent must be finite and > 0, got {g}"
            )));
        }
        if to_xyz.iter().flatten().any(|v| !v.is_finite()) {
            return Err(LayerModeError::config("profile matrix must be finite"));
        }
        Ok(Self { to_xyz, trc })
    }

    /// The linear RGB to XYZ matrix.
    pub fn to_xyz(&self) -> &Mat3 {
        &self.to_xyz
    }

    /// The profile's own transfer curve.
    pub fn trc(&self) -> Trc {
        self.trc
    }

    /// XYZ to linear RGB, or `None` when the primaries are degenerate.
    pub fn from_xyz(&self) -> Option<Mat3> {
        invert(&self.to_xyz)
    }
}

impl Default for RgbProfile {
    fn default() -> Self {
        Self::srgb()
    }
}

/// A concrete pixel format: the space pixel data is stored in, and the profile that
/// gives the space its meaning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelFormat {
    /// Encoding of the stored samples.
    pub space: ColorSpace,
    /// Working profile.
    pub profile: RgbProfile,
}

impl PixelFormat {
    /// Build a format.
    pub const fn new(space: ColorSpace, profile: RgbProfile) -> Self {
        Self { space, profile }
    }

    /// Linear sRGB float.
    pub const fn linear_srgb() -> Self {
        Self::new(ColorSpace::RgbLinear, RgbProfile::srgb())
    }
}

pub(crate) fn mul(m: &Mat3, v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn invert(m: &Mat3) -> Option<Mat3> {
    let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
    if !det.is_finite() || det.abs() < 1e-8 {
        return None;
    }
    let inv = 1.0 / det;
    Some([
        [
            c00 * inv,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
        ],
        [
            c01 * inv,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
        ],
        [
            c02 * inv,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
        ],
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/color/profile.rs"]
mod tests;
