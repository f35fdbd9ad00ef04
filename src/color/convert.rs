use crate::color::profile::{Mat3, RgbProfile, Trc, mul};
use crate::foundation::core::{ColorSpace, Pixel};

// CIE D50 reference white.
const WHITE_D50: [f32; 3] = [0.964_2, 1.0, 0.824_9];
const LAB_EPSILON: f32 = 216.0 / 24_389.0;
const LAB_KAPPA: f32 = 24_389.0 / 27.0;

/// A conversion between two concrete spaces of one profile.
///
/// Alpha is carried through untouched. Every sample is converted independently, so
/// splitting a run at any point yields the same bits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Converter {
    from: ColorSpace,
    to: ColorSpace,
    profile: RgbProfile,
    from_xyz: Mat3,
}

impl Converter {
    /// Build a converter, or `None` when the profile cannot express the round trip
    /// (a Lab leg over degenerate primaries).
    pub fn new(from: ColorSpace, to: ColorSpace, profile: RgbProfile) -> Option<Self> {
        let needs_xyz = from == ColorSpace::Lab || to == ColorSpace::Lab;
        let from_xyz = match profile.from_xyz() {
            Some(m) => m,
            None if needs_xyz => return None,
            None => [[0.0; 3]; 3],
        };
        Some(Self {
            from,
            to,
            profile,
            from_xyz,
        })
    }

    /// Source space.
    pub fn from_space(&self) -> ColorSpace {
        self.from
    }

    /// Destination space.
    pub fn to_space(&self) -> ColorSpace {
        self.to
    }

    /// Profile the converter was built for.
    pub fn profile(&self) -> &RgbProfile {
        &self.profile
    }

    /// Convert one sample.
    pub fn convert_pixel(&self, px: Pixel) -> Pixel {
        if self.from == self.to {
            return px;
        }
        let linear = self.decode(px.rgb());
        Pixel::from_rgb(self.encode(linear), px.a)
    }

    /// Convert `src` into `dst`; the slices must have equal length.
    pub fn convert(&self, src: &[Pixel], dst: &mut [Pixel]) {
        debug_assert_eq!(src.len(), dst.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.convert_pixel(*s);
        }
    }

    /// Convert a run in place.
    pub fn convert_in_place(&self, buf: &mut [Pixel]) {
        for px in buf {
            *px = self.convert_pixel(*px);
        }
    }

    fn decode(&self, v: [f32; 3]) -> [f32; 3] {
        match self.from {
            ColorSpace::RgbLinear => v,
            ColorSpace::RgbPerceptual => v.map(|c| Trc::Srgb.to_linear(c)),
            ColorSpace::RgbNonLinear => {
                let trc = self.profile.trc();
                v.map(|c| trc.to_linear(c))
            }
            ColorSpace::Lab => mul(&self.from_xyz, lab_to_xyz(v)),
        }
    }

    fn encode(&self, v: [f32; 3]) -> [f32; 3] {
        match self.to {
            ColorSpace::RgbLinear => v,
            ColorSpace::RgbPerceptual => v.map(|c| Trc::Srgb.from_linear(c)),
            ColorSpace::RgbNonLinear => {
                let trc = self.profile.trc();
                v.map(|c| trc.from_linear(c))
            }
            ColorSpace::Lab => xyz_to_lab(mul(self.profile.to_xyz(), v)),
        }
    }
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

fn xyz_to_lab(xyz: [f32; 3]) -> [f32; 3] {
    let fx = lab_f(xyz[0] / WHITE_D50[0]);
    let fy = lab_f(xyz[1] / WHITE_D50[1]);
    let fz = lab_f(xyz[2] / WHITE_D50[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn lab_to_xyz(lab: [f32; 3]) -> [f32; 3] {
    let [l, a, b] = lab;
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let cube_or_linear = |f: f32| {
        let f3 = f * f * f;
        if f3 > LAB_EPSILON {
            f3
        } else {
            (116.0 * f - 16.0) / LAB_KAPPA
        }
    };
    let yr = if l > LAB_KAPPA * LAB_EPSILON {
        fy * fy * fy
    } else {
        l / LAB_KAPPA
    };
    [
        cube_or_linear(fx) * WHITE_D50[0],
        yr * WHITE_D50[1],
        cube_or_linear(fz) * WHITE_D50[2],
    ]
}

/// One cell of the conversion table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fish {
    /// Source and destination agree; nothing to do.
    Identity,
    /// A real conversion.
    Convert(Converter),
    /// The conversion cannot be performed for this profile.
    Unavailable,
}

impl Fish {
    /// Resolve the cell for `from -> to` under `profile`.
    pub fn between(from: ColorSpace, to: ColorSpace, profile: RgbProfile) -> Self {
        if from == to {
            return Self::Identity;
        }
        match Converter::new(from, to, profile) {
            Some(c) => Self::Convert(c),
            None => Self::Unavailable,
        }
    }

    /// `true` for [`Fish::Identity`].
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// `false` only for [`Fish::Unavailable`].
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// The converter, if this cell carries one.
    pub fn converter(&self) -> Option<&Converter> {
        match self {
            Self::Convert(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/convert.rs"]
mod tests;
