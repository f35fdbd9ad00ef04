use super::*;

#[test]
fn empty_object_is_the_default() {
    let config = LayerModeConfig::from_json("{}").unwrap();
    assert_eq!(config, LayerModeConfig::default());
    assert_eq!(config.opacity, 1.0);
    assert_eq!(config.pipeline.unblended_run_threshold, 32);
}

#[test]
fn kebab_case_fields_and_values() {
    let config = LayerModeConfig::from_json(
        r#"{
            "opacity": 0.25,
            "blend-space": "rgb-perceptual",
            "composite-space": "lab",
            "composite-mode": "clip-to-backdrop",
            "pipeline": { "unblended-run-threshold": 0 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.opacity, 0.25);
    assert_eq!(config.blend_space, LayerColorSpace::RgbPerceptual);
    assert_eq!(config.composite_space, LayerColorSpace::Lab);
    assert_eq!(config.composite_mode, LayerCompositeMode::ClipToBackdrop);
    assert_eq!(config.pipeline.unblended_run_threshold, 0);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = LayerModeConfig::from_json(r#"{"opacty": 0.5}"#).unwrap_err();
    assert!(matches!(err, LayerModeError::Serde(_)));
    assert!(err.to_string().starts_with("serialization error:"));
}

#[test]
fn out_of_range_opacity_is_a_config_error() {
    for bad in ["1.5", "-0.1"] {
        let err = LayerModeConfig::from_json(&format!(r#"{{"opacity": {bad}}}"#)).unwrap_err();
        assert!(matches!(err, LayerModeError::Config(_)), "{bad}");
    }
    assert!(validate_opacity(f32::NAN).is_err());
    assert!(validate_opacity(0.0).is_ok());
    assert!(validate_opacity(1.0).is_ok());
}

#[test]
fn round_trips_through_json() {
    let config = LayerModeConfig {
        opacity: 0.5,
        composite_mode: LayerCompositeMode::Intersection,
        ..LayerModeConfig::default()
    };
    let s = serde_json::to_string(&config).unwrap();
    assert!(s.contains("\"composite-mode\":\"intersection\""));
    assert_eq!(LayerModeConfig::from_json(&s).unwrap(), config);
}

#[test]
fn missing_file_keeps_the_io_error() {
    let path = std::env::temp_dir().join("layermode-config-that-does-not-exist.json");
    let err = LayerModeConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, LayerModeError::Other(_)));
    assert!(err.to_string().contains("layermode-config-that-does-not-exist.json"));

    let LayerModeError::Other(inner) = err else {
        unreachable!()
    };
    let io = inner.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn loads_from_a_file() {
    let path = std::env::temp_dir().join(format!("layermode-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"opacity": 0.75, "composite-mode": "union"}"#).unwrap();
    let loaded = LayerModeConfig::from_path(&path);
    std::fs::remove_file(&path).unwrap();

    let config = loaded.unwrap();
    assert_eq!(config.opacity, 0.75);
    assert_eq!(config.composite_mode, LayerCompositeMode::Union);

    std::fs::write(&path, r#"{"opacity": 2.0}"#).unwrap();
    let loaded = LayerModeConfig::from_path(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(loaded, Err(LayerModeError::Config(_))));
}
