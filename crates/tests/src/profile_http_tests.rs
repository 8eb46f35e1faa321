use axum::http::StatusCode;
use auth_core::{Credential, HttpProfileResolver, ProfileError, ProfileResolver};
use pretty_assertions::assert_eq;
use shared_types::Role;

use crate::common;

#[tokio::test]
async fn test_fetch_sends_bearer_credential() {
    let backend = common::spawn_profile_with_role("ADMIN").await;
    let resolver = HttpProfileResolver::new(backend.base_url());

    let profile = resolver
        .fetch_profile(&Credential::new("id-token-123"))
        .await
        .unwrap();

    assert_eq!(profile.role(), Role::Admin);
    assert_eq!(profile.uid.as_deref(), Some(common::UID));
    assert_eq!(
        backend.authorization_headers(),
        vec!["Bearer id-token-123".to_string()]
    );
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let backend = common::spawn_profile_with_role("EMPLOYEE").await;
    let resolver = HttpProfileResolver::new(format!("{}/", backend.base_url()));

    let profile = resolver.fetch_profile(&Credential::new("t")).await.unwrap();

    assert_eq!(profile.role(), Role::Employee);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_extra_fields_are_kept() {
    let body = r#"{"uid":"u","email":"e@example.com","role":"MANAGER","team":"north","active":true}"#;
    let backend = common::spawn_profile_backend(StatusCode::OK, body).await;
    let resolver = HttpProfileResolver::new(backend.base_url());

    let profile = resolver.fetch_profile(&Credential::new("t")).await.unwrap();

    assert_eq!(profile.role(), Role::Manager);
    assert_eq!(profile.extra["team"], "north");
    assert_eq!(profile.extra["active"], true);
}

#[tokio::test]
async fn test_non_string_role_is_treated_as_missing() {
    let backend = common::spawn_profile_backend(StatusCode::OK, r#"{"role":7}"#).await;
    let resolver = HttpProfileResolver::new(backend.base_url());

    let profile = resolver.fetch_profile(&Credential::new("t")).await.unwrap();

    assert_eq!(profile.role, None);
    assert_eq!(profile.role(), Role::Employee);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let backend = common::spawn_profile_backend(StatusCode::FORBIDDEN, "{}").await;
    let resolver = HttpProfileResolver::new(backend.base_url());

    let err = resolver
        .fetch_profile(&Credential::new("t"))
        .await
        .unwrap_err();

    assert_eq!(err, ProfileError::Status { status: 403 });
}

#[tokio::test]
async fn test_array_body_is_malformed() {
    let backend = common::spawn_profile_backend(StatusCode::OK, r#"["MANAGER"]"#).await;
    let resolver = HttpProfileResolver::new(backend.base_url());

    let err = resolver
        .fetch_profile(&Credential::new("t"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProfileError::Malformed(_)));
}
