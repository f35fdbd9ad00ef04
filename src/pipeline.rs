//! Chunked blend + composite over pixel runs.
//!
//! Runs longer than [`MAX_CHUNK`] are processed chunk by chunk so the scratch space needed
//! per call is a fixed constant. Within a chunk, when blending happens in a different space
//! than compositing, only the sub-ranges where both inputs have coverage are converted.

use std::cell::RefCell;

use crate::color::convert::Converter;
use crate::composite::CompositeKernel;
use crate::foundation::core::Pixel;
use crate::mode::BlendFn;

/// Upper bound on the scratch memory one chunk may use.
pub const SCRATCH_BUDGET_BYTES: usize = 256 * 1024;

/// Per-pixel scratch buffers a chunk can need at once (blend-space backdrop, blend-space
/// layer, and the blend output when compositing in place).
pub const SCRATCH_BUFFERS: usize = 3;

/// Samples processed per chunk.
pub const MAX_CHUNK: usize = 4096;

const _: () =
    assert!(MAX_CHUNK * SCRATCH_BUFFERS * std::mem::size_of::<Pixel>() <= SCRATCH_BUDGET_BYTES);

/// Default length of an unblended run that ends a converted sub-range.
pub const DEFAULT_UNBLENDED_RUN_THRESHOLD: usize = 32;

static TRANSPARENT_RUN: [Pixel; MAX_CHUNK] = [Pixel::TRANSPARENT; MAX_CHUNK];

/// Tuning for the pixel pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PipelineOpts {
    /// A run of this many consecutive unblended samples splits the converted range; shorter
    /// gaps are converted along with their neighbours. `0` converts every chunk whole.
    pub unblended_run_threshold: usize,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            unblended_run_threshold: DEFAULT_UNBLENDED_RUN_THRESHOLD,
        }
    }
}

/// Converters into and out of the blend space.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BlendConversion {
    pub(crate) to_blend: Converter,
    pub(crate) from_blend: Converter,
}

/// One fully resolved blend + composite configuration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Pipeline {
    pub(crate) blend: BlendFn,
    pub(crate) kernel: CompositeKernel,
    pub(crate) opacity: f32,
    pub(crate) conversion: Option<BlendConversion>,
    pub(crate) opts: PipelineOpts,
}

#[derive(Default)]
struct Scratch {
    blend_in: Vec<Pixel>,
    blend_layer: Vec<Pixel>,
    comp: Vec<Pixel>,
}

impl Scratch {
    fn reserve_chunk(&mut self) {
        for buf in [&mut self.blend_in, &mut self.blend_layer, &mut self.comp] {
            if buf.len() < MAX_CHUNK {
                buf.resize(MAX_CHUNK, Pixel::TRANSPARENT);
            }
        }
    }
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = RefCell::new(Scratch::default());
}

fn with_scratch<R>(f: impl FnOnce(&mut Scratch) -> R) -> R {
    SCRATCH.with(|cell| match cell.try_borrow_mut() {
        Ok(mut scratch) => {
            scratch.reserve_chunk();
            f(&mut scratch)
        }
        // A blend function re-entered the pipeline on this thread.
        Err(_) => {
            let mut scratch = Scratch::default();
            scratch.reserve_chunk();
            f(&mut scratch)
        }
    })
}

#[inline]
fn is_unblended(input: &Pixel, layer: &Pixel) -> bool {
    input.a == 0.0 || layer.a == 0.0
}

fn chunk_bounds(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len)
        .step_by(MAX_CHUNK)
        .map(move |start| (start, (start + MAX_CHUNK).min(len)))
}

impl Pipeline {
    /// Blend and composite `input` with `layer` into `out`.
    pub(crate) fn run(
        &self,
        input: &[Pixel],
        layer: &[Pixel],
        mask: Option<&[f32]>,
        out: &mut [Pixel],
    ) {
        with_scratch(|scratch| {
            for (start, end) in chunk_bounds(out.len()) {
                let input = &input[start..end];
                let layer = &layer[start..end];
                let mask = mask.map(|m| &m[start..end]);
                let out = &mut out[start..end];

                self.blend_chunk(input, layer, out, scratch);
                self.kernel.run(input, layer, mask, self.opacity, out);
            }
        });
    }

    /// Same as [`Pipeline::run`] with the output written over the backdrop.
    pub(crate) fn run_in_place(
        &self,
        input_out: &mut [Pixel],
        layer: &[Pixel],
        mask: Option<&[f32]>,
    ) {
        with_scratch(|scratch| {
            let mut comp = std::mem::take(&mut scratch.comp);
            for (start, end) in chunk_bounds(input_out.len()) {
                let input = &mut input_out[start..end];
                let layer = &layer[start..end];
                let mask = mask.map(|m| &m[start..end]);
                // The backdrop is still read by the composite step, so the blend output
                // needs its own buffer.
                let comp = &mut comp[..end - start];

                self.blend_chunk(input, layer, comp, scratch);
                self.kernel.run(input, layer, mask, self.opacity, comp);
                input.copy_from_slice(comp);
            }
            scratch.comp = comp;
        });
    }

    /// Composite `layer` over an empty backdrop through the full blend + composite path,
    /// using the last-node kernel whatever the configured composite mode.
    pub(crate) fn run_over_transparent(
        &self,
        layer: &[Pixel],
        mask: Option<&[f32]>,
        out: &mut [Pixel],
    ) {
        let kernel = self.kernel.for_last_node();
        with_scratch(|scratch| {
            for (start, end) in chunk_bounds(out.len()) {
                let input = &TRANSPARENT_RUN[..end - start];
                let layer = &layer[start..end];
                let mask = mask.map(|m| &m[start..end]);
                let out = &mut out[start..end];

                self.blend_chunk(input, layer, out, scratch);
                kernel.run(input, layer, mask, self.opacity, out);
            }
        });
    }

    fn blend_chunk(
        &self,
        input: &[Pixel],
        layer: &[Pixel],
        comp: &mut [Pixel],
        scratch: &mut Scratch,
    ) {
        let Some(conv) = self.conversion else {
            (self.blend)(input, layer, comp);
            return;
        };

        let n = comp.len();
        let threshold = self.opts.unblended_run_threshold;
        if threshold == 0 {
            self.blend_converted(&conv, input, layer, comp, 0..n, scratch);
            return;
        }

        let mut i = 0;
        while i < n {
            while i < n && is_unblended(&input[i], &layer[i]) {
                comp[i] = layer[i].with_alpha(0.0);
                i += 1;
            }
            if i == n {
                break;
            }

            let first = i;
            let mut end = i + 1;
            let mut gap = 0;
            for j in first + 1..n {
                if is_unblended(&input[j], &layer[j]) {
                    gap += 1;
                    if gap == threshold {
                        break;
                    }
                } else {
                    end = j + 1;
                    gap = 0;
                }
            }

            self.blend_converted(&conv, input, layer, comp, first..end, scratch);
            i = end;
        }
    }

    fn blend_converted(
        &self,
        conv: &BlendConversion,
        input: &[Pixel],
        layer: &[Pixel],
        comp: &mut [Pixel],
        range: std::ops::Range<usize>,
        scratch: &mut Scratch,
    ) {
        let blend_in = &mut scratch.blend_in[range.clone()];
        let blend_layer = &mut scratch.blend_layer[range.clone()];
        let comp = &mut comp[range.clone()];

        conv.to_blend.convert(&input[range.clone()], blend_in);
        conv.to_blend.convert(&layer[range], blend_layer);
        (self.blend)(blend_in, blend_layer, comp);
        conv.from_blend.convert_in_place(comp);
    }
}

/// Output when there is nothing below the layer and the blend leaves the layer's color
/// alone: the layer with its alpha scaled by opacity and mask.
pub(crate) fn composite_last_node(
    layer: &[Pixel],
    mask: Option<&[f32]>,
    opacity: f32,
    out: &mut [Pixel],
) {
    match mask {
        Some(mask) => {
            for ((o, l), &m) in out.iter_mut().zip(layer).zip(mask) {
                *o = l.with_alpha(l.a * opacity * m);
            }
        }
        None => {
            for (o, l) in out.iter_mut().zip(layer) {
                *o = l.with_alpha(l.a * opacity);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
