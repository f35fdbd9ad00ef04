use crate::foundation::core::{
    ColorSpace, CompositeMode, CompositeRegion, LayerColorSpace, LayerCompositeMode, Pixel,
};

/// A blend function: `(input, layer, comp)`.
///
/// Writes the blended color of every sample into `comp`. Additive blends set `comp.a` to
/// `layer.a`; subtractive blends set it to the fraction of coverage they keep. Color
/// channels of `comp` are unconstrained where either input alpha is zero.
pub type BlendFn = fn(&[Pixel], &[Pixel], &mut [Pixel]);

/// Included regions per concrete composite mode, indexed by [`CompositeMode::index`].
pub const DEFAULT_INCLUDED_REGIONS: [CompositeRegion; 4] = [
    CompositeRegion::BOTH,
    CompositeRegion::DESTINATION,
    CompositeRegion::SOURCE,
    CompositeRegion::NONE,
];

/// Everything the kernel needs to know about a layer mode.
///
/// Supplied by the caller's mode registry; the kernel never looks modes up by itself.
#[derive(Clone, Copy, Debug)]
pub struct LayerModeInfo {
    /// Human-readable name used in diagnostics.
    pub name: &'static str,
    /// The blend function.
    pub blend: BlendFn,
    /// Whether `blend` reports retained coverage instead of layer alpha.
    pub subtractive: bool,
    /// Preferred blend space; `Auto` means linear RGB.
    pub blend_space: LayerColorSpace,
    /// Preferred composite space; `Auto` lets the input format decide.
    pub composite_space: LayerColorSpace,
    /// Preferred composite mode; `Auto` means union.
    pub composite_mode: LayerCompositeMode,
    /// Which inputs can show through the result, per composite mode.
    pub included_regions: [CompositeRegion; 4],
    /// The blend alters the layer even over an empty backdrop at full opacity.
    pub affects_source: bool,
    /// Callers may override the blend space.
    pub blend_space_mutable: bool,
    /// Callers may override the composite space.
    pub composite_space_mutable: bool,
    /// Callers may override the composite mode.
    pub composite_mode_mutable: bool,
}

impl LayerModeInfo {
    /// A mutable, additive mode with automatic spaces and the default region table.
    pub const fn new(name: &'static str, blend: BlendFn) -> Self {
        Self {
            name,
            blend,
            subtractive: false,
            blend_space: LayerColorSpace::Auto,
            composite_space: LayerColorSpace::Auto,
            composite_mode: LayerCompositeMode::Auto,
            included_regions: DEFAULT_INCLUDED_REGIONS,
            affects_source: false,
            blend_space_mutable: true,
            composite_space_mutable: true,
            composite_mode_mutable: true,
        }
    }

    /// Mark the mode subtractive.
    pub const fn with_subtractive(mut self, subtractive: bool) -> Self {
        self.subtractive = subtractive;
        self
    }

    /// Set the default spaces.
    pub const fn with_spaces(mut self, blend: LayerColorSpace, composite: LayerColorSpace) -> Self {
        self.blend_space = blend;
        self.composite_space = composite;
        self
    }

    /// Set the default composite mode.
    pub const fn with_composite_mode(mut self, mode: LayerCompositeMode) -> Self {
        self.composite_mode = mode;
        self
    }

    /// Declare that the blend alters the layer on its own.
    pub const fn with_affects_source(mut self, affects: bool) -> Self {
        self.affects_source = affects;
        self
    }

    /// Forbid overriding the spaces and the composite mode.
    pub const fn immutable(mut self) -> Self {
        self.blend_space_mutable = false;
        self.composite_space_mutable = false;
        self.composite_mode_mutable = false;
        self
    }

    /// Included region for a concrete composite mode.
    pub const fn included_region(&self, mode: CompositeMode) -> CompositeRegion {
        self.included_regions[mode.index()]
    }

    pub(crate) fn resolve_blend_space(&self, requested: LayerColorSpace) -> ColorSpace {
        requested
            .or(self.blend_space)
            .concrete()
            .unwrap_or(ColorSpace::RgbLinear)
    }

    pub(crate) fn resolve_composite_mode(&self, requested: LayerCompositeMode) -> CompositeMode {
        match requested {
            LayerCompositeMode::Auto => self.composite_mode,
            other => other,
        }
        .concrete()
        .unwrap_or(CompositeMode::Union)
    }
}

#[cfg(test)]
#[path = "../tests/unit/mode.rs"]
mod tests;
