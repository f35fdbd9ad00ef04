pub mod algebra;
pub(crate) mod caps;
pub(crate) mod wide;

use crate::composite::caps::CpuCaps;
use crate::foundation::core::{CompositeMode, Pixel};

/// A composite run: backdrop, layer, optional mask, opacity, and the blended run which is
/// overwritten with the result.
pub type CompositeFn = fn(&[Pixel], &[Pixel], Option<&[f32]>, f32, &mut [Pixel]);

/// The composite law chosen for one `(mode, subtractive)` pair, resolved once per prepare.
#[derive(Clone, Copy)]
pub struct CompositeKernel {
    mode: CompositeMode,
    subtractive: bool,
    accelerated: bool,
    run: CompositeFn,
}

impl CompositeKernel {
    /// Pick the implementation for `mode`, preferring a lane-batched one when `caps` allows.
    pub fn select(mode: CompositeMode, subtractive: bool, caps: CpuCaps) -> Self {
        let accelerated =
            caps.has_wide_lanes() && !subtractive && mode == CompositeMode::ClipToBackdrop;

        let run: CompositeFn = match (mode, subtractive) {
            _ if accelerated => wide::clip_to_backdrop,
            (CompositeMode::Union, false) => union_run,
            (CompositeMode::ClipToBackdrop, false) => clip_to_backdrop_run,
            (CompositeMode::ClipToLayer, false) => clip_to_layer_run,
            (CompositeMode::Intersection, false) => intersection_run,
            (CompositeMode::Union, true) => union_sub_run,
            (CompositeMode::ClipToBackdrop, true) => clip_to_backdrop_sub_run,
            (CompositeMode::ClipToLayer, true) => clip_to_layer_sub_run,
            (CompositeMode::Intersection, true) => intersection_sub_run,
        };

        Self {
            mode,
            subtractive,
            accelerated,
            run,
        }
    }

    /// The kernel used when there is no backdrop.
    ///
    /// Only the layer is included then, so every mode composites with the layer-clipped law;
    /// the backdrop-clipped laws would erase the whole layer.
    pub fn for_last_node(&self) -> Self {
        Self::select(CompositeMode::ClipToLayer, self.subtractive, CpuCaps::scalar())
    }

    /// Composite a run. `comp` holds the blended samples and receives the result.
    #[inline]
    pub fn run(
        &self,
        input: &[Pixel],
        layer: &[Pixel],
        mask: Option<&[f32]>,
        opacity: f32,
        comp: &mut [Pixel],
    ) {
        (self.run)(input, layer, mask, opacity, comp);
    }

    /// The composite mode this kernel implements.
    pub fn mode(&self) -> CompositeMode {
        self.mode
    }

    /// Whether the subtractive alpha law is used.
    pub fn is_subtractive(&self) -> bool {
        self.subtractive
    }

    /// Whether a lane-batched implementation was selected.
    pub fn is_accelerated(&self) -> bool {
        self.accelerated
    }
}

fn union_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::union, i, l, m, o, c);
}

fn clip_to_backdrop_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::clip_to_backdrop, i, l, m, o, c);
}

fn clip_to_layer_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::clip_to_layer, i, l, m, o, c);
}

fn intersection_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::intersection, i, l, m, o, c);
}

fn union_sub_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::union_sub, i, l, m, o, c);
}

fn clip_to_backdrop_sub_run(
    i: &[Pixel],
    l: &[Pixel],
    m: Option<&[f32]>,
    o: f32,
    c: &mut [Pixel],
) {
    algebra::apply(algebra::clip_to_backdrop_sub, i, l, m, o, c);
}

fn clip_to_layer_sub_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::clip_to_layer_sub, i, l, m, o, c);
}

fn intersection_sub_run(i: &[Pixel], l: &[Pixel], m: Option<&[f32]>, o: f32, c: &mut [Pixel]) {
    algebra::apply(algebra::intersection_sub, i, l, m, o, c);
}

impl std::fmt::Debug for CompositeKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeKernel")
            .field("mode", &self.mode)
            .field("subtractive", &self.subtractive)
            .field("accelerated", &self.accelerated)
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/composite/kernel.rs"]
mod tests;
