use crate::error::ApiError;
use crate::http::{apply_auth, build_agent, join_url, read_response, REQUEST_TIMEOUT};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const LOGIN_PATH: &str = "auth/jwt/create/";
const LOGOUT_PATH: &str = "api/users/auth/logout/";

/// Failures from the external auth collaborator. Invalid credentials are
/// surfaced distinctly from everything else; neither touches workflow state.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "access")]
    pub access_token: String,
    #[serde(rename = "refresh")]
    pub refresh_token: String,
}

fn classify(err: ApiError) -> AuthError {
    match err {
        ApiError::Status { code: 400, .. } => AuthError::InvalidCredentials,
        other => AuthError::Api(other),
    }
}

pub fn login(base_url: &str, email: &str, password: &str) -> Result<TokenPair, AuthError> {
    let url = join_url(base_url, LOGIN_PATH);
    let payload = json!({ "username": email, "password": password }).to_string();
    let agent = build_agent(REQUEST_TIMEOUT);
    let req = agent
        .post(&url)
        .set("Content-Type", "application/json")
        .set("Accept", "application/json");
    let body = read_response(req.send_string(&payload)).map_err(classify)?;
    let tokens = serde_json::from_str::<TokenPair>(&body).map_err(|e| {
        AuthError::Api(ApiError::invalid_response(format!(
            "failed to parse token response: {e}"
        )))
    })?;
    tracing::info!(target: "script_api", "login succeeded for {email}");
    Ok(tokens)
}

pub fn logout(base_url: &str, access_token: &str) -> Result<(), AuthError> {
    let url = join_url(base_url, LOGOUT_PATH);
    let agent = build_agent(REQUEST_TIMEOUT);
    let req = agent.post(&url).set("Content-Type", "application/json");
    let req = apply_auth(req, Some(access_token));
    read_response(req.send_string("{}")).map_err(AuthError::Api)?;
    tracing::info!(target: "script_api", "logout succeeded");
    Ok(())
}
