use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{LayerColorSpace, LayerCompositeMode};
use crate::foundation::error::{LayerModeError, LayerModeResult};
use crate::pipeline::PipelineOpts;

/// Serializable configuration of one layer-mode operation.
///
/// ```json
/// { "opacity": 0.5, "blend-space": "rgb-perceptual", "composite-mode": "clip-to-backdrop" }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LayerModeConfig {
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Space the blend function runs in.
    pub blend_space: LayerColorSpace,
    /// Space the composite step runs in.
    pub composite_space: LayerColorSpace,
    /// Composite law.
    pub composite_mode: LayerCompositeMode,
    /// Pipeline tuning.
    pub pipeline: PipelineOpts,
}

impl Default for LayerModeConfig {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            blend_space: LayerColorSpace::Auto,
            composite_space: LayerColorSpace::Auto,
            composite_mode: LayerCompositeMode::Auto,
            pipeline: PipelineOpts::default(),
        }
    }
}

impl LayerModeConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(s: &str) -> LayerModeResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| LayerModeError::serde(format!("invalid layer mode config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> LayerModeResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read layer mode config '{}'", path.display()))?;
        Self::from_json(&s)
    }

    /// Check value ranges.
    pub fn validate(&self) -> LayerModeResult<()> {
        validate_opacity(self.opacity)
    }
}

pub(crate) fn validate_opacity(opacity: f32) -> LayerModeResult<()> {
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(LayerModeError::config(format!(
            "opacity must be within [0, 1], got {opacity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
