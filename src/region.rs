//! Which inputs can affect the output, and the pass-through shortcuts that follow from it.

use crate::foundation::core::{CompositeMode, CompositeRegion};
use crate::mode::LayerModeInfo;

/// Inputs that can show through the result.
///
/// With no backdrop only the layer is included. Otherwise the registry's table decides, and
/// a fully transparent layer (opacity 0) drops out.
pub fn included_region(
    info: &LayerModeInfo,
    mode: CompositeMode,
    opacity: f32,
    is_last_node: bool,
) -> CompositeRegion {
    if is_last_node {
        return CompositeRegion::SOURCE;
    }

    let included = info.included_region(mode);
    if opacity == 0.0 {
        included.without(CompositeRegion::SOURCE)
    } else {
        included
    }
}

/// Inputs whose pixels the operation may change (as opposed to pass through verbatim).
pub fn affected_region(info: &LayerModeInfo, opacity: f32, has_mask: bool) -> CompositeRegion {
    let mut affected = CompositeRegion::NONE;
    if opacity != 0.0 {
        affected = affected | CompositeRegion::DESTINATION;
    }
    if opacity != 1.0 || has_mask || info.affects_source {
        affected = affected | CompositeRegion::SOURCE;
    }
    affected
}

/// Outcome of the per-render pass-through decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassThrough {
    /// The output is the layer, unchanged.
    Layer,
    /// The output is the backdrop, unchanged.
    Backdrop,
    /// Nothing survives; the output is transparent.
    Empty,
    /// Run the pixel pipeline.
    Process,
}

/// Decide how a render can be satisfied.
///
/// `backdrop_present`/`layer_present` say whether the caller supplied those streams; a layer
/// at opacity 0 counts as absent. The shortcuts produce the same visible pixels as the
/// pipeline: an absent layer leaves every composite law at the backdrop (or at zero alpha),
/// and an absent backdrop reduces to the layer scaled by opacity and mask.
pub fn pass_through(
    included: CompositeRegion,
    affected: CompositeRegion,
    backdrop_present: bool,
    layer_present: bool,
) -> PassThrough {
    if !layer_present {
        return if backdrop_present && included.contains(CompositeRegion::DESTINATION) {
            PassThrough::Backdrop
        } else {
            PassThrough::Empty
        };
    }

    if !backdrop_present {
        if !included.contains(CompositeRegion::SOURCE) {
            return PassThrough::Empty;
        }
        if !affected.contains(CompositeRegion::SOURCE) {
            return PassThrough::Layer;
        }
    }

    PassThrough::Process
}

#[cfg(test)]
#[path = "../tests/unit/region.rs"]
mod tests;
