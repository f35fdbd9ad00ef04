//! Lane-batched composite variants.
//!
//! Samples are processed four at a time in structure-of-arrays form so the compiler can map
//! each channel onto one vector register. Both sides of every branch are computed and the
//! result is selected per lane; the arithmetic is the same expression tree as the scalar law,
//! so results are bit-identical to it.

use crate::composite::algebra;
use crate::foundation::core::Pixel;

const LANES: usize = 4;

type Lane = [f32; LANES];

fn gather(px: &[Pixel], f: impl Fn(&Pixel) -> f32) -> Lane {
    [f(&px[0]), f(&px[1]), f(&px[2]), f(&px[3])]
}

/// Lane-batched [`algebra::clip_to_backdrop`].
pub(crate) fn clip_to_backdrop(
    input: &[Pixel],
    layer: &[Pixel],
    mask: Option<&[f32]>,
    opacity: f32,
    comp: &mut [Pixel],
) {
    debug_assert_eq!(input.len(), comp.len());
    let split = comp.len() - comp.len() % LANES;
    let (head, tail) = comp.split_at_mut(split);

    for (block, c) in head.chunks_exact_mut(LANES).enumerate() {
        let base = block * LANES;
        let i = &input[base..base + LANES];

        let mask_lane: Lane = match mask {
            Some(m) => [m[base], m[base + 1], m[base + 2], m[base + 3]],
            None => [1.0; LANES],
        };
        let in_a = gather(i, |p| p.a);
        let comp_a = gather(c, |p| p.a);

        let mut layer_alpha = [0.0; LANES];
        let mut keep = [false; LANES];
        for k in 0..LANES {
            layer_alpha[k] = comp_a[k] * opacity * mask_lane[k];
            keep[k] = in_a[k] == 0.0 || layer_alpha[k] == 0.0;
        }

        let channels: [(Lane, Lane); 3] = [
            (gather(i, |p| p.r), gather(c, |p| p.r)),
            (gather(i, |p| p.g), gather(c, |p| p.g)),
            (gather(i, |p| p.b), gather(c, |p| p.b)),
        ];
        let mut out = [[0.0; LANES]; 3];
        for (ch, (iv, cv)) in channels.iter().enumerate() {
            for k in 0..LANES {
                let blended = cv[k] * layer_alpha[k] + iv[k] * (1.0 - layer_alpha[k]);
                out[ch][k] = if keep[k] { iv[k] } else { blended };
            }
        }

        for k in 0..LANES {
            c[k] = Pixel::new(out[0][k], out[1][k], out[2][k], in_a[k]);
        }
    }

    algebra::apply(
        algebra::clip_to_backdrop,
        &input[split..],
        &layer[split..],
        mask.map(|m| &m[split..]),
        opacity,
        tail,
    );
}

#[cfg(test)]
#[path = "../../tests/unit/composite/wide.rs"]
mod tests;
