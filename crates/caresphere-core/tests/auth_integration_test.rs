//! Integration tests for login, registration, logout and post-login routing.

use std::sync::Arc;

use caresphere_core::router::{Decision, Redirect, RoleRouter, Route};
use caresphere_core::session::MemorySlots;
use caresphere_core::{GatewayClient, GatewayError, RegisterForm, Role, SessionEvent, SessionStore, StatusCode};
use mockito::{Matcher, Server};
use serde_json::json;

fn anonymous_client(url: &str) -> GatewayClient {
    let store = Arc::new(SessionStore::new(Arc::new(MemorySlots::new())));
    GatewayClient::with_http(reqwest::Client::new(), url, store)
}

fn token_body(role: &str, name: &str, user_id: &str) -> String {
    json!({
        "access_token": "a1",
        "refresh_token": "r1",
        "token_type": "bearer",
        "role": role,
        "name": name,
        "user_id": user_id,
    })
    .to_string()
}

#[tokio::test]
async fn test_login_persists_session() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(json!({"email": "asha@example.test", "password": "secret1"})))
        .with_status(200)
        .with_body(token_body("patient", "Asha", "p-42"))
        .expect(1)
        .create_async()
        .await;

    let client = anonymous_client(&server.url());
    let mut events = client.subscribe();

    let session = client.login("  asha@example.test ", "secret1").await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.role(), Some(Role::Patient));

    let stored = client.session();
    assert_eq!(stored.subject_id(), Some("p-42"));
    assert_eq!(stored.display_name(), Some("Asha"));
    assert_eq!(stored.email(), Some("asha@example.test"));
    assert_eq!(stored.access_token(), Some("a1"));
    assert_eq!(stored.refresh_token(), Some("r1"));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedIn { role: Role::Patient });

    login.assert_async().await;
}

#[tokio::test]
async fn test_login_rejected_does_not_refresh() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"detail":"Invalid email or password"}"#)
        .create_async()
        .await;
    let refresh = server.mock("POST", "/auth/refresh").expect(0).create_async().await;

    let client = anonymous_client(&server.url());
    let err = client.login("asha@example.test", "wrong").await.unwrap_err();

    match err {
        GatewayError::Api { status, detail } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(detail, "Invalid email or password");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(!client.session().is_authenticated());
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let client = anonymous_client("http://127.0.0.1:9");
    let err = client.login("   ", "secret1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));
}

#[tokio::test]
async fn test_register_doctor_signs_in() {
    let mut server = Server::new_async().await;
    let register = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::Json(json!({
            "name": "Dr. Rao",
            "email": "rao@example.test",
            "password": "secret1",
            "role": "doctor",
            "specialization": "Cardiology",
        })))
        .with_status(200)
        .with_body(token_body("doctor", "Dr. Rao", "d-17"))
        .expect(1)
        .create_async()
        .await;

    let client = anonymous_client(&server.url());
    let form = RegisterForm {
        name: "Dr. Rao".to_string(),
        email: "rao@example.test".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        role: Role::Doctor,
        specialization: Some("cardiology".to_string()),
    };
    let session = client.register(&form).await.unwrap();

    assert_eq!(session.role(), Some(Role::Doctor));
    assert_eq!(client.session().subject_id(), Some("d-17"));
    register.assert_async().await;
}

#[tokio::test]
async fn test_register_invalid_form_never_reaches_backend() {
    let mut server = Server::new_async().await;
    let register = server.mock("POST", "/auth/register").expect(0).create_async().await;

    let client = anonymous_client(&server.url());
    let form = RegisterForm {
        name: "Asha".to_string(),
        email: "asha@example.test".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret2".to_string(),
        role: Role::Patient,
        specialization: None,
    };
    let err = client.register(&form).await.unwrap_err();

    assert!(matches!(err, GatewayError::Validation(ref message) if message == "Passwords do not match."));
    register.assert_async().await;
}

#[tokio::test]
async fn test_register_conflict_surfaces_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/register")
        .with_status(400)
        .with_body(r#"{"detail":"Email already registered"}"#)
        .create_async()
        .await;

    let client = anonymous_client(&server.url());
    let form = RegisterForm {
        name: "Asha".to_string(),
        email: "asha@example.test".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        role: Role::Patient,
        specialization: None,
    };
    let err = client.register(&form).await.unwrap_err();
    assert!(matches!(err, GatewayError::Api { status, .. } if status == StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(token_body("patient", "Asha", "p-42"))
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/auth/logout")
        .match_header("authorization", "Bearer a1")
        .match_body(Matcher::Json(json!({"refresh_token": "r1"})))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let client = anonymous_client(&server.url());
    client.login("asha@example.test", "secret1").await.unwrap();
    let mut events = client.subscribe();

    client.logout().await.unwrap();

    assert!(!client.session().is_authenticated());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
    logout.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(token_body("doctor", "Dr. Rao", "d-17"))
        .create_async()
        .await;
    server.mock("POST", "/auth/logout").with_status(500).create_async().await;

    let client = anonymous_client(&server.url());
    client.login("rao@example.test", "secret1").await.unwrap();
    client.logout().await.unwrap();

    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_logout_when_signed_out_is_quiet() {
    let client = anonymous_client("http://127.0.0.1:9");
    client.logout().await.unwrap();
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_guarded_page_remembers_path_until_login() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(token_body("patient", "Asha", "p-42"))
        .create_async()
        .await;

    let client = anonymous_client(&server.url());
    let router = RoleRouter::new(Arc::clone(client.store()));

    // A signed-out visitor deep-links into the doctor area.
    let Decision::Redirect(redirect) = router.navigate("/doctor/patients") else {
        panic!("anonymous visitor must be redirected");
    };
    assert_eq!(redirect.to, "/login");
    assert_eq!(redirect.return_to.as_deref(), Some("/doctor/patients"));

    // They sign in as a patient: the doctor path is not theirs, so they land home.
    let session = client.login("asha@example.test", "secret1").await.unwrap();
    let role = session.role().unwrap();
    let destination = RoleRouter::post_login_destination(role, redirect.return_to.as_deref());
    assert_eq!(destination, "/patient");
    assert_eq!(router.navigate(&destination), Decision::Render(Route::parse("/patient").unwrap()));

    // Any later attempt at the doctor area bounces back to the patient home.
    assert_eq!(
        router.navigate("/doctor/patients"),
        Decision::Redirect(Redirect { to: "/patient".to_string(), return_to: None })
    );
}
