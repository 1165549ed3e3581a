#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum_test::{TestResponse, TestServer};
use gatehouse_core::{identity::AuthCrypto, infrastructure::InMemoryIdentityRepository};
use gatehouse_server::{
    AppState, create_app,
    infra::{config::Config, startup::build_services_with},
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "Secret#1";

#[derive(Debug)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(Config::default()).await
}

/// In-memory app whose test server keeps cookies between requests, like a
/// browser would.
pub async fn spawn_app_with(config: Config) -> Result<TestApp> {
    let services = build_services_with(
        config,
        Arc::new(InMemoryIdentityRepository::default()),
        Arc::new(AuthCrypto::for_tests()),
    )
    .await?;
    let state = services.state.clone();
    let server = serve(state.clone())?;
    Ok(TestApp { server, state })
}

pub fn serve(state: AppState) -> Result<TestServer> {
    TestServer::builder()
        .save_cookies()
        .build(create_app(state))
        .map_err(|err| anyhow!(err.to_string()))
}

pub async fn register(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/Accounts/Register")
        .form(&json!({
            "email": email,
            "password": password,
            "confirmPassword": password,
        }))
        .await
}

pub async fn login(
    server: &TestServer,
    email: &str,
    password: &str,
    remember_me: bool,
) -> TestResponse {
    let mut form = json!({ "email": email, "password": password });
    if remember_me {
        form["rememberMe"] = json!("on");
    }
    server.post("/Accounts/Login").form(&form).await
}

pub async fn create_role(server: &TestServer, name: &str) -> TestResponse {
    server
        .post("/Admin/CreateRole")
        .form(&json!({ "roleName": name }))
        .await
}

pub async fn create_user(server: &TestServer, email: &str, role: Option<&str>) -> TestResponse {
    let mut form = json!({ "email": email, "password": PASSWORD });
    if let Some(role) = role {
        form["role"] = json!(role);
    }
    server.post("/Admin/CreateUser").form(&form).await
}

pub async fn assign_role(server: &TestServer, email: &str, role: &str) -> TestResponse {
    server
        .post("/Admin/AssignRole")
        .form(&json!({ "email": email, "role": role }))
        .await
}

pub fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn set_cookies(response: &TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect()
}

pub fn errors(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
