use super::*;

fn keep_layer(_input: &[Pixel], layer: &[Pixel], comp: &mut [Pixel]) {
    comp.copy_from_slice(layer);
}

#[test]
fn new_is_mutable_additive_and_auto() {
    let info = LayerModeInfo::new("normal", keep_layer);
    assert_eq!(info.name, "normal");
    assert!(!info.subtractive);
    assert!(!info.affects_source);
    assert!(
        info.blend_space_mutable && info.composite_space_mutable && info.composite_mode_mutable
    );
    assert_eq!(info.blend_space, LayerColorSpace::Auto);
    assert_eq!(info.composite_mode, LayerCompositeMode::Auto);
}

#[test]
fn default_region_table() {
    let info = LayerModeInfo::new("normal", keep_layer);
    assert_eq!(info.included_region(CompositeMode::Union), CompositeRegion::BOTH);
    assert_eq!(
        info.included_region(CompositeMode::ClipToBackdrop),
        CompositeRegion::DESTINATION
    );
    assert_eq!(info.included_region(CompositeMode::ClipToLayer), CompositeRegion::SOURCE);
    assert_eq!(info.included_region(CompositeMode::Intersection), CompositeRegion::NONE);
}

#[test]
fn auto_resolution_falls_back_to_mode_then_builtin() {
    let plain = LayerModeInfo::new("normal", keep_layer);
    assert_eq!(plain.resolve_blend_space(LayerColorSpace::Auto), ColorSpace::RgbLinear);
    assert_eq!(plain.resolve_composite_mode(LayerCompositeMode::Auto), CompositeMode::Union);

    let tuned = LayerModeInfo::new("overlay", keep_layer)
        .with_spaces(LayerColorSpace::RgbPerceptual, LayerColorSpace::Auto)
        .with_composite_mode(LayerCompositeMode::ClipToBackdrop);
    assert_eq!(tuned.resolve_blend_space(LayerColorSpace::Auto), ColorSpace::RgbPerceptual);
    assert_eq!(
        tuned.resolve_composite_mode(LayerCompositeMode::Auto),
        CompositeMode::ClipToBackdrop
    );
}

#[test]
fn explicit_request_wins_over_mode_default() {
    let tuned = LayerModeInfo::new("overlay", keep_layer)
        .with_spaces(LayerColorSpace::RgbPerceptual, LayerColorSpace::Auto)
        .with_composite_mode(LayerCompositeMode::ClipToBackdrop);
    assert_eq!(tuned.resolve_blend_space(LayerColorSpace::Lab), ColorSpace::Lab);
    assert_eq!(
        tuned.resolve_composite_mode(LayerCompositeMode::Intersection),
        CompositeMode::Intersection
    );
}

#[test]
fn immutable_clears_every_flag() {
    let info = LayerModeInfo::new("erase", keep_layer)
        .with_subtractive(true)
        .with_affects_source(true)
        .immutable();
    assert!(info.subtractive);
    assert!(info.affects_source);
    assert!(!info.blend_space_mutable);
    assert!(!info.composite_space_mutable);
    assert!(!info.composite_mode_mutable);
}
