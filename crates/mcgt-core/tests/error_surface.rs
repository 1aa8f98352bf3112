use mcgt_core::errors::{ErrorInfo, McgtError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", "zz-data/chapter08/sn.csv")
        .with_context("row", "3")
}

#[test]
fn config_error_surface() {
    let err = McgtError::Config(sample_info("CFG001", "unknown key"));
    assert_eq!(err.info().code, "CFG001");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn cosmology_error_surface() {
    let err = McgtError::Cosmology(sample_info("COS001", "E^2 non-positive"));
    assert_eq!(err.info().code, "COS001");
    assert!(err.info().context.contains_key("row"));
}

#[test]
fn integration_error_surface() {
    let err = McgtError::Integration(sample_info("INT001", "step underflow"));
    assert_eq!(err.info().code, "INT001");
}

#[test]
fn sampler_error_surface() {
    let err = McgtError::Sampler(sample_info("SMP001", "odd walker count"));
    assert_eq!(err.info().code, "SMP001");
}

#[test]
fn display_includes_context_and_hint() {
    let err = McgtError::Data(sample_info("DAT001", "sigma must be positive").with_hint("check column"));
    let rendered = err.to_string();
    assert_eq!(
        rendered,
        "data error: [DAT001] sigma must be positive (path=zz-data/chapter08/sn.csv, row=3); hint: check column"
    );
}

#[test]
fn context_can_be_added_after_construction() {
    let err = McgtError::Likelihood(ErrorInfo::new("LIK001", "no probes")).with_context("job", "a.yaml");
    assert!(matches!(err, McgtError::Likelihood(_)));
    assert_eq!(err.info().context["job"], "a.yaml");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = McgtError::Stats(ErrorInfo::new("STA001", "empty group"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Stats");
    assert_eq!(json["detail"]["code"], "STA001");
    let back: McgtError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
