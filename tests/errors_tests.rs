//! Error type tests

use std::collections::HashSet;

use linklet::errors::LinkletError;

#[test]
fn test_error_codes_are_unique() {
    let errors = [
        LinkletError::cache_connection("x"),
        LinkletError::cache_operation("x"),
        LinkletError::database_config("x"),
        LinkletError::database_connection("x"),
        LinkletError::database_operation("x"),
        LinkletError::duplicate_id("x"),
        LinkletError::not_found("x"),
        LinkletError::validation("x"),
        LinkletError::allocation_exhausted("x"),
        LinkletError::sync_partial_failure("x"),
        LinkletError::serialization("x"),
    ];

    let codes: HashSet<&str> = errors.iter().map(|e| e.code()).collect();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn test_soft_errors_never_surface() {
    assert!(LinkletError::cache_connection("down").is_soft());
    assert!(LinkletError::cache_operation("timeout").is_soft());
    assert!(LinkletError::sync_partial_failure("skipped").is_soft());

    assert!(!LinkletError::database_operation("x").is_soft());
    assert!(!LinkletError::not_found("x").is_soft());
    assert!(!LinkletError::allocation_exhausted("x").is_soft());
}

#[test]
fn test_display_format() {
    let err = LinkletError::not_found("Short link not found: promo");
    assert_eq!(
        err.to_string(),
        "Resource Not Found: Short link not found: promo"
    );
}

#[test]
fn test_from_conversions() {
    let err: LinkletError = serde_json::from_str::<u32>("oops").unwrap_err().into();
    assert!(matches!(err, LinkletError::Serialization(_)));
}
