use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PanelError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        PanelError::image_analysis("x")
            .to_string()
            .contains("image analysis failure:")
    );
    assert!(
        PanelError::render("x")
            .to_string()
            .contains("render failure:")
    );
    assert!(
        PanelError::resource_exhaustion("x")
            .to_string()
            .contains("resource exhaustion:")
    );
    assert!(
        PanelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn only_configuration_is_fatal() {
    assert!(PanelError::configuration("bad format").is_fatal());
    assert!(!PanelError::render("disk full").is_fatal());
    assert!(!PanelError::Timeout(Duration::from_secs(1)).is_fatal());
}

#[test]
fn only_resource_exhaustion_is_retryable() {
    assert!(PanelError::resource_exhaustion("oom").is_retryable());
    assert!(!PanelError::Timeout(Duration::from_millis(5)).is_retryable());
    assert!(!PanelError::render("x").is_retryable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PanelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
