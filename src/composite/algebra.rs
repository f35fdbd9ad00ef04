//! Per-sample composite laws.
//!
//! Each function takes the backdrop (`input`), the layer, the blended color `comp`, a mask
//! value (1.0 when there is no mask) and the opacity, and returns the composited sample.
//!
//! For additive modes `comp.a` equals `layer.a`. For subtractive modes `comp.a` is the
//! fraction of existing coverage the blend keeps (1.0 removes nothing).
//!
//! Color channels of a zero-alpha input may be NaN. Every branch that would read them is
//! gated on the corresponding alpha, and no multiplication ever touches them.

use crate::foundation::core::Pixel;

/// Source-over.
#[inline]
pub fn union(input: Pixel, layer: Pixel, comp: Pixel, mask: f32, opacity: f32) -> Pixel {
    let in_alpha = input.a;
    let layer_alpha = layer.a * opacity * mask;
    let new_alpha = layer_alpha + (1.0 - layer_alpha) * in_alpha;

    let rgb = if layer_alpha == 0.0 || new_alpha == 0.0 {
        input.rgb()
    } else if in_alpha == 0.0 {
        layer.rgb()
    } else {
        let ratio = layer_alpha / new_alpha;
        let (i, l, c) = (input.rgb(), layer.rgb(), comp.rgb());
        [0, 1, 2].map(|k| ratio * (in_alpha * (c[k] - l[k]) + l[k] - i[k]) + i[k])
    };

    Pixel::from_rgb(rgb, new_alpha)
}

/// Source-atop; backdrop alpha is preserved.
#[inline]
pub fn clip_to_backdrop(
    input: Pixel,
    _layer: Pixel,
    comp: Pixel,
    mask: f32,
    opacity: f32,
) -> Pixel {
    let layer_alpha = comp.a * opacity * mask;

    let rgb = if input.a == 0.0 || layer_alpha == 0.0 {
        input.rgb()
    } else {
        let (i, c) = (input.rgb(), comp.rgb());
        [0, 1, 2].map(|k| c[k] * layer_alpha + i[k] * (1.0 - layer_alpha))
    };

    Pixel::from_rgb(rgb, input.a)
}

/// Destination-atop; the result takes the layer's (scaled) alpha.
#[inline]
pub fn clip_to_layer(input: Pixel, layer: Pixel, comp: Pixel, mask: f32, opacity: f32) -> Pixel {
    let layer_alpha = layer.a * opacity * mask;

    let rgb = if layer_alpha == 0.0 {
        input.rgb()
    } else if input.a == 0.0 {
        layer.rgb()
    } else {
        let (l, c) = (layer.rgb(), comp.rgb());
        [0, 1, 2].map(|k| c[k] * input.a + l[k] * (1.0 - input.a))
    };

    Pixel::from_rgb(rgb, layer_alpha)
}

/// Source-in.
#[inline]
pub fn intersection(input: Pixel, _layer: Pixel, comp: Pixel, mask: f32, opacity: f32) -> Pixel {
    let new_alpha = input.a * comp.a * opacity * mask;

    let rgb = if new_alpha == 0.0 {
        input.rgb()
    } else {
        comp.rgb()
    };

    Pixel::from_rgb(rgb, new_alpha)
}

/// Source-over under the subtractive alpha law.
#[inline]
pub fn union_sub(input: Pixel, layer: Pixel, comp: Pixel, mask: f32, opacity: f32) -> Pixel {
    let in_alpha = input.a;
    let layer_alpha = layer.a * opacity * mask;
    let comp_alpha = comp.a;
    let new_alpha = in_alpha + layer_alpha - (2.0 - comp_alpha) * in_alpha * layer_alpha;

    let rgb = if layer_alpha == 0.0 || new_alpha == 0.0 {
        input.rgb()
    } else if in_alpha == 0.0 {
        layer.rgb()
    } else {
        let ratio = in_alpha / new_alpha;
        let layer_coeff = 1.0 / in_alpha - 1.0;
        let (i, l, c) = (input.rgb(), layer.rgb(), comp.rgb());
        [0, 1, 2].map(|k| {
            ratio * (layer_alpha * (comp_alpha * c[k] + layer_coeff * l[k] - i[k]) + i[k])
        })
    };

    Pixel::from_rgb(rgb, new_alpha)
}

/// Source-atop under the subtractive alpha law.
#[inline]
pub fn clip_to_backdrop_sub(
    input: Pixel,
    layer: Pixel,
    comp: Pixel,
    mask: f32,
    opacity: f32,
) -> Pixel {
    let layer_alpha = layer.a * opacity * mask;
    let comp_alpha = comp.a * layer_alpha;
    let new_alpha = 1.0 - layer_alpha + comp_alpha;

    let rgb = if input.a == 0.0 || comp_alpha == 0.0 {
        input.rgb()
    } else {
        let ratio = comp_alpha / new_alpha;
        let (i, c) = (input.rgb(), comp.rgb());
        [0, 1, 2].map(|k| c[k] * ratio + i[k] * (1.0 - ratio))
    };

    Pixel::from_rgb(rgb, new_alpha * input.a)
}

/// Destination-atop under the subtractive alpha law.
#[inline]
pub fn clip_to_layer_sub(
    input: Pixel,
    layer: Pixel,
    comp: Pixel,
    mask: f32,
    opacity: f32,
) -> Pixel {
    let layer_alpha = layer.a * opacity * mask;
    let comp_alpha = comp.a * input.a;
    let new_alpha = 1.0 - input.a + comp_alpha;

    let rgb = if layer_alpha == 0.0 {
        input.rgb()
    } else if comp_alpha == 0.0 {
        layer.rgb()
    } else {
        let ratio = comp_alpha / new_alpha;
        let (l, c) = (layer.rgb(), comp.rgb());
        [0, 1, 2].map(|k| c[k] * ratio + l[k] * (1.0 - ratio))
    };

    Pixel::from_rgb(rgb, new_alpha * layer_alpha)
}

/// Source-in under the subtractive alpha law.
#[inline]
pub fn intersection_sub(
    input: Pixel,
    layer: Pixel,
    comp: Pixel,
    mask: f32,
    opacity: f32,
) -> Pixel {
    let new_alpha = input.a * layer.a * comp.a * opacity * mask;

    let rgb = if new_alpha == 0.0 {
        input.rgb()
    } else {
        comp.rgb()
    };

    Pixel::from_rgb(rgb, new_alpha)
}

/// Signature shared by the per-sample laws above.
pub type SampleFn = fn(Pixel, Pixel, Pixel, f32, f32) -> Pixel;

/// Apply `law` across a run. `comp` holds the blended samples on entry and the composited
/// result on return.
#[inline]
pub(crate) fn apply(
    law: SampleFn,
    input: &[Pixel],
    layer: &[Pixel],
    mask: Option<&[f32]>,
    opacity: f32,
    comp: &mut [Pixel],
) {
    debug_assert_eq!(input.len(), comp.len());
    debug_assert_eq!(layer.len(), comp.len());
    match mask {
        Some(mask) => {
            debug_assert_eq!(mask.len(), comp.len());
            for (((c, &i), &l), &m) in comp.iter_mut().zip(input).zip(layer).zip(mask) {
                *c = law(i, l, *c, m, opacity);
            }
        }
        None => {
            for ((c, &i), &l) in comp.iter_mut().zip(input).zip(layer) {
                *c = law(i, l, *c, 1.0, opacity);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/algebra.rs"]
mod tests;
