use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Request, StatusCode},
    response::IntoResponse,
};
use delivery_core::{
    app_error::AuthError,
    config::Config,
    db::{Database, Session},
    delivery::DeliveryKey,
    model::AppState,
    token::AccessClaims,
};
use serde_json::json;

async fn test_state() -> AppState {
    let config = Config::new("sqlite::memory:", "jwt-secret", "secret123")
        .unwrap()
        .with_database_echo(false)
        .with_bcrypt_cost(4)
        .unwrap();
    let db = Database::connect(&config).await.unwrap();
    AppState::new(config, db)
}

fn parts_with(headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().uri("/orders");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

#[tokio::test]
async fn delivery_header_with_configured_key_passes() {
    let state = test_state().await;
    let mut parts = parts_with(&[("x-api-key", "secret123")]);

    assert!(DeliveryKey::from_request_parts(&mut parts, &state).await.is_ok());
}

#[tokio::test]
async fn delivery_header_with_wrong_key_is_401() {
    let state = test_state().await;
    let mut parts = parts_with(&[("x-api-key", "wrong")]);

    let rejection = DeliveryKey::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(rejection, AuthError::InvalidDeliveryKey);

    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
        json!({"detail": "Invalid delivery key"})
    );
}

#[tokio::test]
async fn missing_delivery_header_is_rejected() {
    let state = test_state().await;
    let mut parts = parts_with(&[]);

    let rejection = DeliveryKey::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(rejection, AuthError::MissingDeliveryKey);
}

#[tokio::test]
async fn issued_token_is_accepted_as_bearer() {
    let state = test_state().await;
    let token = state
        .tokens
        .create_access_token(&json!({"sub": "alice"}))
        .unwrap();
    let bearer = format!("Bearer {token}");
    let mut parts = parts_with(&[("authorization", bearer.as_str())]);

    let claims = AccessClaims::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(claims.subject(), Some("alice"));
}

#[tokio::test]
async fn missing_bearer_is_invalid_token() {
    let state = test_state().await;
    let mut parts = parts_with(&[]);

    let rejection = AccessClaims::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(rejection, AuthError::InvalidToken);
}

#[tokio::test]
async fn login_flow_hashes_then_issues_token() {
    let state = test_state().await;

    let stored = state.passwords.hash("correct horse").unwrap();
    assert!(!state.passwords.verify("wrong horse", &stored));
    assert!(state.passwords.verify("correct horse", &stored));
    assert!(!state.passwords.needs_rehash(&stored));

    let token = state
        .tokens
        .create_access_token(&json!({"sub": "alice", "role": "dispatcher"}))
        .unwrap();
    let claims = state.tokens.decode_access_token(&token).unwrap();
    assert_eq!(claims["role"], "dispatcher");
}

#[tokio::test]
async fn sessions_are_independent() {
    let state = test_state().await;

    let mut first = state.db.session().await.unwrap();
    let mut second = state.db.session().await.unwrap();
    assert_ne!(first.id(), second.id());

    let a: i64 = sqlx::query_scalar("SELECT 1")
        .fetch_one(&mut *first)
        .await
        .unwrap();
    let b: i64 = sqlx::query_scalar("SELECT 2")
        .fetch_one(&mut *second)
        .await
        .unwrap();
    assert_eq!((a, b), (1, 2));
}

#[tokio::test]
async fn session_extractor_acquires_from_state() {
    let state = test_state().await;
    let mut parts = parts_with(&[]);

    let mut session = Session::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    let value: i64 = sqlx::query_scalar("SELECT 42")
        .fetch_one(&mut *session)
        .await
        .unwrap();
    assert_eq!(value, 42);
}

#[tokio::test]
async fn session_transaction_commits() {
    let state = test_state().await;
    let mut session = state.db.session().await.unwrap();

    sqlx::query("CREATE TABLE orders (id INTEGER PRIMARY KEY, status TEXT NOT NULL)")
        .execute(&mut *session)
        .await
        .unwrap();

    let mut tx = session.begin().await.unwrap();
    sqlx::query("INSERT INTO orders (status) VALUES ('pending')")
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&mut *session)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn bad_database_url_fails_at_connect() {
    let config = Config::new("nosuchdb://nowhere", "jwt-secret", "secret123").unwrap();
    assert!(Database::connect(&config).await.is_err());
}
