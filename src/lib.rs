//! `layermode` is the compositing kernel behind layer modes.
//!
//! It combines a backdrop pixel run with a layer run (and an optional coverage mask) using an
//! injected blend function followed by one of eight composite laws. The surrounding
//! application owns the mode registry, the render graph and scheduling:
//!
//! - Describe a mode with a [`LayerModeInfo`] (blend function, defaults, region table)
//! - Create a [`LayerModeOperation`] per compositing node and [`prepare`] it
//! - Call [`process`] (or [`render`]) from any number of worker threads
//!
//! [`prepare`]: LayerModeOperation::prepare
//! [`process`]: LayerModeOperation::process
//! [`render`]: LayerModeOperation::render
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod color;
/// Composite laws and kernel selection.
pub mod composite;
pub(crate) mod config;
pub(crate) mod mode;
pub(crate) mod operation;
pub(crate) mod pipeline;
pub mod region;

pub use crate::foundation::core::{
    ColorSpace, CompositeMode, CompositeRegion, LayerColorSpace, LayerCompositeMode, Pixel,
};
pub use crate::foundation::error::{LayerModeError, LayerModeResult};

pub use crate::color::cache::ConversionCache;
pub use crate::color::convert::{Converter, Fish};
pub use crate::color::profile::{Mat3, PixelFormat, RgbProfile, Trc};
pub use crate::composite::caps::CpuCaps;
pub use crate::composite::{CompositeFn, CompositeKernel};
pub use crate::config::LayerModeConfig;
pub use crate::mode::{BlendFn, DEFAULT_INCLUDED_REGIONS, LayerModeInfo};
pub use crate::operation::{LayerModeOperation, PrepareContext};
pub use crate::pipeline::{
    DEFAULT_UNBLENDED_RUN_THRESHOLD, MAX_CHUNK, PipelineOpts, SCRATCH_BUDGET_BYTES,
    SCRATCH_BUFFERS,
};
pub use crate::region::PassThrough;
