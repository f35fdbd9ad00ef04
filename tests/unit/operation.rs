use super::*;
use crate::color::profile::{RgbProfile, Trc};
use crate::foundation::core::CompositeMode;

fn normal(_input: &[Pixel], layer: &[Pixel], comp: &mut [Pixel]) {
    comp.copy_from_slice(layer);
}

fn op() -> LayerModeOperation {
    LayerModeOperation::new(LayerModeInfo::new("normal", normal), CpuCaps::scalar())
}

fn linear() -> PrepareContext {
    PrepareContext::new(PixelFormat::linear_srgb())
}

#[test]
fn process_before_prepare_is_a_state_error() {
    let op = op();
    let mut out = [Pixel::TRANSPARENT];
    let err = op
        .process(&[Pixel::TRANSPARENT], &[Pixel::TRANSPARENT], None, &mut out)
        .unwrap_err();
    assert!(matches!(err, LayerModeError::State(_)));
    assert!(op.included_region().is_err());
}

#[test]
fn composite_space_follows_the_preferred_format() {
    let mut op = op();
    let srgb = RgbProfile::srgb();
    for (preferred, expected) in [
        (ColorSpace::RgbLinear, ColorSpace::RgbLinear),
        (ColorSpace::RgbPerceptual, ColorSpace::RgbPerceptual),
        (ColorSpace::RgbNonLinear, ColorSpace::RgbLinear),
        (ColorSpace::Lab, ColorSpace::RgbLinear),
    ] {
        let format = op
            .prepare(PrepareContext::new(PixelFormat::new(preferred, srgb)))
            .unwrap();
        assert_eq!(format.space, expected, "{preferred:?}");
    }

    op.set_composite_space(LayerColorSpace::Lab).unwrap();
    let format = op.prepare(linear()).unwrap();
    assert_eq!(format.space, ColorSpace::Lab);
}

#[test]
fn mode_defaults_apply_when_auto() {
    let info = LayerModeInfo::new("overlay", normal)
        .with_spaces(LayerColorSpace::RgbPerceptual, LayerColorSpace::RgbLinear)
        .with_composite_mode(LayerCompositeMode::ClipToBackdrop);
    let mut op = LayerModeOperation::new(info, CpuCaps::scalar());
    let format = op.prepare(linear()).unwrap();
    assert_eq!(format.space, ColorSpace::RgbLinear);
    assert_eq!(op.composite_kernel().unwrap().mode(), CompositeMode::ClipToBackdrop);
    assert_eq!(op.included_region().unwrap(), CompositeRegion::DESTINATION);
}

#[test]
fn opacity_keeps_preparation_but_spaces_do_not() {
    let mut op = op();
    op.prepare(linear()).unwrap();

    op.set_opacity(0.5).unwrap();
    assert!(op.is_prepared());
    assert!(op.set_opacity(1.5).is_err());
    assert_eq!(op.opacity(), 0.5);

    op.set_composite_space(LayerColorSpace::Auto).unwrap();
    assert!(op.is_prepared());
    op.set_blend_space(LayerColorSpace::Lab).unwrap();
    assert!(!op.is_prepared());
    op.prepare(linear()).unwrap();
    op.set_composite_mode(LayerCompositeMode::Intersection).unwrap();
    assert!(!op.is_prepared());
}

#[test]
fn immutable_modes_reject_overrides() {
    let info = LayerModeInfo::new("erase", normal)
        .with_subtractive(true)
        .with_spaces(LayerColorSpace::RgbLinear, LayerColorSpace::RgbLinear)
        .with_composite_mode(LayerCompositeMode::Union)
        .immutable();
    let mut op = LayerModeOperation::new(info, CpuCaps::scalar());

    assert!(op.set_blend_space(LayerColorSpace::RgbLinear).is_ok());
    assert!(op.set_composite_mode(LayerCompositeMode::Auto).is_ok());
    let err = op.set_composite_mode(LayerCompositeMode::ClipToLayer).unwrap_err();
    assert!(matches!(err, LayerModeError::Config(_)));
    assert!(op.set_blend_space(LayerColorSpace::Lab).is_err());
    assert!(op.set_composite_space(LayerColorSpace::RgbPerceptual).is_err());
}

#[test]
fn singular_profile_cannot_blend_in_lab() {
    let flat = RgbProfile::new([[0.0; 3]; 3], Trc::Linear).unwrap();
    let mut op = op();
    op.set_blend_space(LayerColorSpace::Lab).unwrap();
    let err = op
        .prepare(PrepareContext::new(PixelFormat::new(ColorSpace::RgbLinear, flat)))
        .unwrap_err();
    assert!(matches!(err, LayerModeError::Config(_)));
    assert!(!op.is_prepared());

    op.set_blend_space(LayerColorSpace::RgbPerceptual).unwrap();
    assert!(op
        .prepare(PrepareContext::new(PixelFormat::new(ColorSpace::RgbLinear, flat)))
        .is_ok());
}

#[test]
fn mismatched_lengths_are_buffer_errors() {
    let mut op = op();
    op.prepare(linear().with_mask(true)).unwrap();
    let px = [Pixel::new(0.1, 0.2, 0.3, 1.0); 4];
    let mut out = [Pixel::TRANSPARENT; 4];

    let err = op.process(&px[..3], &px, None, &mut out).unwrap_err();
    assert!(matches!(err, LayerModeError::Buffer(_)));
    assert!(op.process(&px, &px[..2], None, &mut out).is_err());
    assert!(op.process(&px, &px, Some(&[1.0; 3][..]), &mut out).is_err());
    assert!(op.process(&px, &px, Some(&[1.0; 4][..]), &mut out).is_ok());
}

#[test]
fn unexpected_mask_is_a_state_error() {
    let mut op = op();
    op.prepare(linear()).unwrap();
    let px = [Pixel::new(0.1, 0.2, 0.3, 1.0); 2];
    let mut out = [Pixel::TRANSPARENT; 2];
    let err = op.process(&px, &px, Some(&[1.0; 2][..]), &mut out).unwrap_err();
    assert!(matches!(err, LayerModeError::State(_)));
}

#[test]
fn render_rejects_an_unexpected_mask_before_any_shortcut() {
    let mut op = op();
    let backdrop = [Pixel::new(0.0, 1.0, 0.0, 1.0); 2];
    let layer = [Pixel::new(1.0, 0.0, 0.0, 1.0); 2];
    let mask = [0.5; 2];
    let mut out = [Pixel::TRANSPARENT; 2];

    op.prepare(linear()).unwrap();
    let err = op
        .render(Some(&backdrop[..]), None, Some(&mask[..]), &mut out)
        .unwrap_err();
    assert!(matches!(err, LayerModeError::State(_)));
    assert_eq!(out, [Pixel::TRANSPARENT; 2]);

    op.prepare(linear().with_backdrop(false)).unwrap();
    let err = op
        .render(None, Some(&layer[..]), Some(&mask[..]), &mut out)
        .unwrap_err();
    assert!(matches!(err, LayerModeError::State(_)));
    assert_eq!(out, [Pixel::TRANSPARENT; 2]);

    op.prepare(linear().with_mask(true)).unwrap();
    let d = op
        .render(Some(&backdrop[..]), None, Some(&mask[..]), &mut out)
        .unwrap();
    assert_eq!(d, PassThrough::Backdrop);
}

#[test]
fn last_node_requires_an_empty_backdrop() {
    let mut op = op();
    op.prepare(linear().with_backdrop(false)).unwrap();
    assert_eq!(op.included_region().unwrap(), CompositeRegion::SOURCE);

    let layer = [Pixel::new(0.4, 0.5, 0.6, 0.8)];
    let mut out = [Pixel::TRANSPARENT];
    assert!(op.process(&layer, &layer, None, &mut out).is_err());
    assert!(op.process_in_place(&mut out, &layer, None).is_err());

    op.set_opacity(0.5).unwrap();
    op.process(&[], &layer, None, &mut out).unwrap();
    assert_eq!(out[0], Pixel::new(0.4, 0.5, 0.6, 0.4));
}

#[test]
fn render_takes_shortcuts() {
    let mut op = op();
    let backdrop = [Pixel::new(0.0, 1.0, 0.0, 1.0); 3];
    let layer = [Pixel::new(1.0, 0.0, 0.0, 0.5); 3];
    let mut out = [Pixel::TRANSPARENT; 3];

    op.prepare(linear()).unwrap();
    let d = op.render(Some(&backdrop[..]), None, None, &mut out).unwrap();
    assert_eq!(d, PassThrough::Backdrop);
    assert_eq!(out, backdrop);

    let d = op.render(Some(&backdrop[..]), Some(&layer[..]), None, &mut out).unwrap();
    assert_eq!(d, PassThrough::Process);
    assert_eq!(out[0].a, 1.0);

    op.set_opacity(0.0).unwrap();
    let d = op.render(Some(&backdrop[..]), Some(&layer[..]), None, &mut out).unwrap();
    assert_eq!(d, PassThrough::Backdrop);

    op.set_opacity(1.0).unwrap();
    op.prepare(linear().with_backdrop(false)).unwrap();
    let d = op.render(None, Some(&layer[..]), None, &mut out).unwrap();
    assert_eq!(d, PassThrough::Layer);
    assert_eq!(out, layer);

    assert!(op.render(Some(&backdrop[..]), Some(&layer[..]), None, &mut out).is_err());
}

#[test]
fn from_config_applies_every_field() {
    let config = LayerModeConfig {
        opacity: 0.3,
        blend_space: LayerColorSpace::RgbPerceptual,
        composite_space: LayerColorSpace::RgbLinear,
        composite_mode: LayerCompositeMode::ClipToLayer,
        pipeline: PipelineOpts {
            unblended_run_threshold: 8,
        },
    };
    let op = LayerModeOperation::from_config(
        LayerModeInfo::new("normal", normal),
        &config,
        CpuCaps::scalar(),
    )
    .unwrap();
    assert_eq!(op.opacity(), 0.3);
    assert_eq!(op.blend_space(), LayerColorSpace::RgbPerceptual);
    assert_eq!(op.composite_space(), LayerColorSpace::RgbLinear);
    assert_eq!(op.composite_mode(), LayerCompositeMode::ClipToLayer);
    assert_eq!(op.pipeline_opts().unblended_run_threshold, 8);
}

#[test]
fn conversion_cache_rebuilds_only_on_format_change() {
    let mut op = op();
    op.set_blend_space(LayerColorSpace::RgbPerceptual).unwrap();
    op.prepare(linear()).unwrap();
    op.prepare(linear().with_mask(true)).unwrap();
    assert_eq!(op.conversion_cache().rebuild_count(), 1);

    let gamma = RgbProfile::new(*RgbProfile::srgb().to_xyz(), Trc::Gamma(2.2)).unwrap();
    op.prepare(PrepareContext::new(PixelFormat::new(ColorSpace::RgbLinear, gamma)))
        .unwrap();
    assert_eq!(op.conversion_cache().rebuild_count(), 2);
}
