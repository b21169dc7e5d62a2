use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FollowPointError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FollowPointError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        FollowPointError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FollowPointError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
