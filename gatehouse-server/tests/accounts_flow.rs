use anyhow::Result;
use axum::http::StatusCode;
use gatehouse_core::identity::CredentialStore;
use serde_json::Value;

#[path = "support/mod.rs"]
mod support;

use support::{PASSWORD, errors, location, login, register, set_cookies, spawn_app};

#[tokio::test]
async fn registration_signs_in_and_notice_shows_once() -> Result<()> {
    let app = spawn_app().await?;

    let response = register(&app.server, "alice@example.com", PASSWORD).await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("gatehouse_session=")));
    // Registration always starts a browser session.
    assert!(cookies.iter().all(|c| !c.contains("Max-Age")));

    let home = app.server.get("/").await;
    home.assert_status_ok();
    let body: Value = home.json();
    assert_eq!(body["notice"], "Registration successful!");
    assert_eq!(body["current_user"], "alice@example.com");

    let again: Value = app.server.get("/").await.json();
    assert!(again.get("notice").is_none());
    assert_eq!(again["current_user"], "alice@example.com");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_redisplays_form() -> Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "bob@example.com", PASSWORD)
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let response = register(&app.server, "BOB@example.com", PASSWORD).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["view"], "Accounts/Register");
    assert_eq!(
        errors(&body),
        vec!["Email 'BOB@example.com' is already taken.".to_string()]
    );
    assert_eq!(body["values"]["email"], "BOB@example.com");
    assert!(body["values"].get("password").is_none());
    assert_eq!(app.state.store.users().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn malformed_registration_reports_every_field() -> Result<()> {
    let app = spawn_app().await?;
    let response = app
        .server
        .post("/Accounts/Register")
        .form(&serde_json::json!({
            "email": "",
            "password": "",
            "confirmPassword": "something",
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        errors(&response.json()),
        vec![
            "The Email field is required.".to_string(),
            "The Password field is required.".to_string(),
            "The password and confirmation password do not match.".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn weak_password_is_refused_without_echo() -> Result<()> {
    let app = spawn_app().await?;
    let response = register(&app.server, "weak@example.com", "abc").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let text = response.text();
    assert!(text.contains("Passwords must be at least 6 characters."));
    assert!(!text.contains("\"abc\""));
    Ok(())
}

#[tokio::test]
async fn login_failures_look_the_same() -> Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "carol@example.com", PASSWORD).await;
    app.server.post("/Accounts/Logout").await;

    let wrong = login(&app.server, "carol@example.com", "Wrong#123", false).await;
    let unknown = login(&app.server, "nobody@example.com", PASSWORD, false).await;

    wrong.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    unknown.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let wrong_errors = errors(&wrong.json());
    assert_eq!(
        wrong_errors,
        vec!["Invalid login attempt. Please try again.".to_string()]
    );
    assert_eq!(wrong_errors, errors(&unknown.json()));
    Ok(())
}

#[tokio::test]
async fn remember_me_sets_persistent_cookie() -> Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "dan@example.com", PASSWORD).await;
    app.server.post("/Accounts/Logout").await;

    let response = login(&app.server, "Dan@Example.com", PASSWORD, true).await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let session = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("gatehouse_session="))
        .expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(session.contains("Max-Age="));

    let body: Value = app.server.get("/").await.json();
    assert_eq!(body["notice"], "Login successful!");
    assert_eq!(body["current_user"], "dan@example.com");
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_and_is_idempotent() -> Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "erin@example.com", PASSWORD).await;
    app.server.get("/").await;

    let response = app.server.post("/Accounts/Logout").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("gatehouse_session=;") && c.contains("Max-Age=0"))
    );

    let body: Value = app.server.get("/").await.json();
    assert_eq!(body["notice"], "You have been logged out.");
    assert!(body.get("current_user").is_none());

    app.server
        .post("/Accounts/Logout")
        .await
        .assert_status(StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let app = spawn_app().await?;
    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "ok");
    Ok(())
}
