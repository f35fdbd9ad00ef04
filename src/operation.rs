use crate::color::cache::ConversionCache;
use crate::color::convert::{Converter, Fish};
use crate::color::profile::PixelFormat;
use crate::composite::CompositeKernel;
use crate::composite::caps::CpuCaps;
use crate::config::{LayerModeConfig, validate_opacity};
use crate::foundation::core::{
    ColorSpace, CompositeRegion, LayerColorSpace, LayerCompositeMode, Pixel,
};
use crate::foundation::error::{LayerModeError, LayerModeResult};
use crate::mode::LayerModeInfo;
use crate::pipeline::{BlendConversion, Pipeline, PipelineOpts, composite_last_node};
use crate::region::{self, PassThrough};

/// What the render graph knows about a node's inputs before rendering it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrepareContext {
    /// Format of the incoming backdrop (or of the layer when there is no backdrop).
    pub preferred_format: PixelFormat,
    /// A backdrop stream is connected; without one the node is the last in its stack.
    pub has_backdrop: bool,
    /// A mask stream is connected.
    pub has_mask: bool,
}

impl PrepareContext {
    /// Context for a node with a backdrop and no mask.
    pub fn new(preferred_format: PixelFormat) -> Self {
        Self {
            preferred_format,
            has_backdrop: true,
            has_mask: false,
        }
    }

    /// Set whether a backdrop is connected.
    pub fn with_backdrop(mut self, has_backdrop: bool) -> Self {
        self.has_backdrop = has_backdrop;
        self
    }

    /// Set whether a mask is connected.
    pub fn with_mask(mut self, has_mask: bool) -> Self {
        self.has_mask = has_mask;
        self
    }
}

#[derive(Clone, Copy, Debug)]
struct Prepared {
    format: PixelFormat,
    blend_space: ColorSpace,
    kernel: CompositeKernel,
    is_last_node: bool,
    has_mask: bool,
}

/// One compositing node: a layer mode plus its per-node configuration.
///
/// Configure with the setters, call [`LayerModeOperation::prepare`] once the inputs are
/// known, then call [`LayerModeOperation::process`] (or [`LayerModeOperation::render`]) from
/// any number of threads on disjoint regions. Changing a space or the composite mode drops
/// the prepared state; changing opacity does not.
#[derive(Debug)]
pub struct LayerModeOperation {
    info: LayerModeInfo,
    caps: CpuCaps,
    opacity: f32,
    blend_space: LayerColorSpace,
    composite_space: LayerColorSpace,
    composite_mode: LayerCompositeMode,
    opts: PipelineOpts,
    prepared: Option<Prepared>,
    cache: ConversionCache,
}

impl LayerModeOperation {
    /// A fully opaque operation with every option on `Auto`.
    pub fn new(info: LayerModeInfo, caps: CpuCaps) -> Self {
        Self {
            info,
            caps,
            opacity: 1.0,
            blend_space: LayerColorSpace::Auto,
            composite_space: LayerColorSpace::Auto,
            composite_mode: LayerCompositeMode::Auto,
            opts: PipelineOpts::default(),
            prepared: None,
            cache: ConversionCache::new(),
        }
    }

    /// Build an operation from a validated configuration.
    pub fn from_config(
        info: LayerModeInfo,
        config: &LayerModeConfig,
        caps: CpuCaps,
    ) -> LayerModeResult<Self> {
        config.validate()?;
        let mut op = Self::new(info, caps);
        op.set_opacity(config.opacity)?;
        op.set_blend_space(config.blend_space)?;
        op.set_composite_space(config.composite_space)?;
        op.set_composite_mode(config.composite_mode)?;
        op.set_pipeline_opts(config.pipeline);
        Ok(op)
    }

    /// The mode this operation applies.
    pub fn info(&self) -> &LayerModeInfo {
        &self.info
    }

    /// Capability record the composite kernel is chosen with.
    pub fn caps(&self) -> CpuCaps {
        self.caps
    }

    /// Current opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Configured (possibly `Auto`) blend space.
    pub fn blend_space(&self) -> LayerColorSpace {
        self.blend_space
    }

    /// Configured (possibly `Auto`) composite space.
    pub fn composite_space(&self) -> LayerColorSpace {
        self.composite_space
    }

    /// Configured (possibly `Auto`) composite mode.
    pub fn composite_mode(&self) -> LayerCompositeMode {
        self.composite_mode
    }

    /// Pipeline tuning.
    pub fn pipeline_opts(&self) -> PipelineOpts {
        self.opts
    }

    /// Whether [`LayerModeOperation::prepare`] has run since the last configuration change.
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// The kernel chosen by the last prepare.
    pub fn composite_kernel(&self) -> Option<CompositeKernel> {
        self.prepared.map(|p| p.kernel)
    }

    /// The conversion cache shared by every render of this node.
    pub fn conversion_cache(&self) -> &ConversionCache {
        &self.cache
    }

    /// Change opacity. Takes effect on the next process call without re-preparing.
    pub fn set_opacity(&mut self, opacity: f32) -> LayerModeResult<()> {
        validate_opacity(opacity)?;
        self.opacity = opacity;
        Ok(())
    }

    /// Change the blend space.
    pub fn set_blend_space(&mut self, space: LayerColorSpace) -> LayerModeResult<()> {
        check_mutable(
            self.info.blend_space_mutable,
            space,
            self.info.blend_space,
            self.info.name,
            "blend space",
        )?;
        if space != self.blend_space {
            self.blend_space = space;
            self.prepared = None;
        }
        Ok(())
    }

    /// Change the composite space.
    pub fn set_composite_space(&mut self, space: LayerColorSpace) -> LayerModeResult<()> {
        check_mutable(
            self.info.composite_space_mutable,
            space,
            self.info.composite_space,
            self.info.name,
            "composite space",
        )?;
        if space != self.composite_space {
            self.composite_space = space;
            self.prepared = None;
        }
        Ok(())
    }

    /// Change the composite mode.
    pub fn set_composite_mode(&mut self, mode: LayerCompositeMode) -> LayerModeResult<()> {
        check_mutable(
            self.info.composite_mode_mutable,
            mode,
            self.info.composite_mode,
            self.info.name,
            "composite mode",
        )?;
        if mode != self.composite_mode {
            self.composite_mode = mode;
            self.prepared = None;
        }
        Ok(())
    }

    /// Change pipeline tuning. Results do not depend on it, so the prepared state is kept.
    pub fn set_pipeline_opts(&mut self, opts: PipelineOpts) {
        self.opts = opts;
    }

    /// Resolve every `Auto` option, pick the composite kernel and validate the color
    /// conversions the configuration needs. Returns the format pixels must be supplied in.
    #[tracing::instrument(skip(self), fields(mode = self.info.name))]
    pub fn prepare(&mut self, ctx: PrepareContext) -> LayerModeResult<PixelFormat> {
        let composite_space = self
            .composite_space
            .or(self.info.composite_space)
            .concrete()
            .unwrap_or(match ctx.preferred_format.space {
                space @ (ColorSpace::RgbLinear | ColorSpace::RgbPerceptual) => space,
                _ => ColorSpace::RgbLinear,
            });
        let format = PixelFormat::new(composite_space, ctx.preferred_format.profile);
        let blend_space = self.info.resolve_blend_space(self.blend_space);
        let mode = self.info.resolve_composite_mode(self.composite_mode);

        let prepared = Prepared {
            format,
            blend_space,
            kernel: CompositeKernel::select(mode, self.info.subtractive, self.caps),
            is_last_node: !ctx.has_backdrop,
            has_mask: ctx.has_mask,
        };
        // Warms the cache and surfaces missing converters now rather than mid-render.
        self.conversion(&prepared)?;

        tracing::debug!(
            ?composite_space,
            ?blend_space,
            ?mode,
            accelerated = prepared.kernel.is_accelerated(),
            is_last_node = prepared.is_last_node,
            "layer mode prepared"
        );
        self.prepared = Some(prepared);
        Ok(format)
    }

    /// Inputs that can show through the output.
    pub fn included_region(&self) -> LayerModeResult<CompositeRegion> {
        let prepared = self.prepared()?;
        Ok(region::included_region(
            &self.info,
            prepared.kernel.mode(),
            self.opacity,
            prepared.is_last_node,
        ))
    }

    /// Inputs whose pixels this operation may change.
    pub fn affected_region(&self) -> LayerModeResult<CompositeRegion> {
        let prepared = self.prepared()?;
        Ok(region::affected_region(&self.info, self.opacity, prepared.has_mask))
    }

    /// Blend and composite one run into `out`.
    ///
    /// `layer`, `mask` and `out` must have the same length. `backdrop` must too, except for
    /// the last node in a stack, where it must be empty.
    pub fn process(
        &self,
        backdrop: &[Pixel],
        layer: &[Pixel],
        mask: Option<&[f32]>,
        out: &mut [Pixel],
    ) -> LayerModeResult<()> {
        let prepared = self.prepared()?;
        check_mask(prepared, mask, out.len())?;
        check_len("layer", layer.len(), out.len())?;

        let pipeline = self.pipeline(prepared)?;
        if prepared.is_last_node {
            if !backdrop.is_empty() {
                return Err(LayerModeError::buffer(
                    "operation was prepared without a backdrop but one was supplied",
                ));
            }
            if self.info.affects_source {
                pipeline.run_over_transparent(layer, mask, out);
            } else {
                composite_last_node(layer, mask, self.opacity, out);
            }
        } else {
            check_len("backdrop", backdrop.len(), out.len())?;
            pipeline.run(backdrop, layer, mask, out);
        }
        Ok(())
    }

    /// Like [`LayerModeOperation::process`], writing the result over the backdrop.
    pub fn process_in_place(
        &self,
        backdrop_out: &mut [Pixel],
        layer: &[Pixel],
        mask: Option<&[f32]>,
    ) -> LayerModeResult<()> {
        let prepared = self.prepared()?;
        if prepared.is_last_node {
            return Err(LayerModeError::buffer("in-place processing needs a backdrop"));
        }
        check_mask(prepared, mask, backdrop_out.len())?;
        check_len("layer", layer.len(), backdrop_out.len())?;

        self.pipeline(prepared)?.run_in_place(backdrop_out, layer, mask);
        Ok(())
    }

    /// Render one run, taking a pass-through shortcut when the inputs allow it.
    ///
    /// `None` marks an absent stream. A layer at opacity 0 is treated as absent.
    pub fn render(
        &self,
        backdrop: Option<&[Pixel]>,
        layer: Option<&[Pixel]>,
        mask: Option<&[f32]>,
        out: &mut [Pixel],
    ) -> LayerModeResult<PassThrough> {
        let prepared = self.prepared()?;
        if backdrop.is_some() == prepared.is_last_node {
            return Err(LayerModeError::state(
                "backdrop presence differs from the prepared context",
            ));
        }
        check_mask(prepared, mask, out.len())?;

        let included = region::included_region(
            &self.info,
            prepared.kernel.mode(),
            self.opacity,
            prepared.is_last_node,
        );
        let affected = region::affected_region(&self.info, self.opacity, prepared.has_mask);
        let decision = region::pass_through(
            included,
            affected,
            backdrop.is_some(),
            layer.is_some() && self.opacity != 0.0,
        );
        tracing::trace!(?decision, ?included, ?affected, "layer mode render");

        match decision {
            PassThrough::Backdrop => {
                let backdrop = backdrop.unwrap_or_default();
                check_len("backdrop", backdrop.len(), out.len())?;
                out.copy_from_slice(backdrop);
            }
            PassThrough::Layer => {
                let layer = layer.unwrap_or_default();
                check_len("layer", layer.len(), out.len())?;
                out.copy_from_slice(layer);
            }
            PassThrough::Empty => out.fill(Pixel::TRANSPARENT),
            PassThrough::Process => self.process(
                backdrop.unwrap_or_default(),
                layer.unwrap_or_default(),
                mask,
                out,
            )?,
        }
        Ok(decision)
    }

    fn prepared(&self) -> LayerModeResult<&Prepared> {
        self.prepared.as_ref().ok_or_else(|| {
            LayerModeError::state(format!(
                "layer mode '{}' must be prepared after configuration changes",
                self.info.name
            ))
        })
    }

    fn pipeline(&self, prepared: &Prepared) -> LayerModeResult<Pipeline> {
        Ok(Pipeline {
            blend: self.info.blend,
            kernel: prepared.kernel,
            opacity: self.opacity,
            conversion: self.conversion(prepared)?,
            opts: self.opts,
        })
    }

    fn conversion(&self, prepared: &Prepared) -> LayerModeResult<Option<BlendConversion>> {
        let composite_space = prepared.format.space;
        if prepared.blend_space == composite_space {
            return Ok(None);
        }

        let lookup = |from: ColorSpace, to: ColorSpace| -> LayerModeResult<Converter> {
            match self.cache.get(&prepared.format, from.into(), to.into()) {
                Fish::Convert(c) => Ok(c),
                Fish::Identity | Fish::Unavailable => Err(LayerModeError::config(format!(
                    "layer mode '{}': no {from:?} -> {to:?} conversion for this profile",
                    self.info.name
                ))),
            }
        };

        Ok(Some(BlendConversion {
            to_blend: lookup(composite_space, prepared.blend_space)?,
            from_blend: lookup(prepared.blend_space, composite_space)?,
        }))
    }
}

fn check_mutable<T: PartialEq + Copy + Default + std::fmt::Debug>(
    mutable: bool,
    requested: T,
    mode_default: T,
    name: &str,
    what: &str,
) -> LayerModeResult<()> {
    if mutable || requested == T::default() || requested == mode_default {
        return Ok(());
    }
    Err(LayerModeError::config(format!(
        "layer mode '{name}' does not allow changing its {what} (requested {requested:?})"
    )))
}

fn check_len(role: &str, len: usize, expected: usize) -> LayerModeResult<()> {
    if len != expected {
        return Err(LayerModeError::buffer(format!(
            "{role} has {len} samples, output has {expected}"
        )));
    }
    Ok(())
}

fn check_mask(prepared: &Prepared, mask: Option<&[f32]>, expected: usize) -> LayerModeResult<()> {
    match mask {
        Some(_) if !prepared.has_mask => Err(LayerModeError::state(
            "a mask was supplied but the operation was prepared without one",
        )),
        Some(mask) => check_len("mask", mask.len(), expected),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/operation.rs"]
mod tests;
