use crate::error::ApiError;
use crate::service::ScriptService;
use crate::types::{
    EditAllScenesRequest, EditSceneRequest, GenerateScenesRequest, ScriptResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

const GENERATE_SCENES_PATH: &str = "api/generate-scenes/";
const EDIT_ALL_SCENES_PATH: &str = "api/edit-all-scenes/";
const EDIT_SCENE_PATH: &str = "api/edit-scene/";

pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .build()
}

pub(crate) fn apply_auth(mut req: ureq::Request, token: Option<&str>) -> ureq::Request {
    if let Some(t) = token {
        if !t.trim().is_empty() {
            req = req.set("Authorization", &format!("Bearer {}", t.trim()));
        }
    }
    req
}

pub(crate) fn read_response(res: Result<ureq::Response, ureq::Error>) -> Result<String, ApiError> {
    match res {
        Ok(resp) => resp
            .into_string()
            .map_err(|e| ApiError::transport(format!("failed to read response body: {e}"))),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(ApiError::Status { code, body })
        }
        Err(other) => Err(ApiError::transport(format!("HTTP error: {other}"))),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn post_json<T: DeserializeOwned>(
    agent: &ureq::Agent,
    url: &str,
    token: Option<&str>,
    body: &impl Serialize,
) -> Result<T, ApiError> {
    let payload = serde_json::to_string(body)
        .map_err(|e| ApiError::transport(format!("failed to encode request body: {e}")))?;
    let req = agent
        .post(url)
        .set("Content-Type", "application/json")
        .set("Accept", "application/json");
    let req = apply_auth(req, token);
    let body_text = read_response(req.send_string(&payload))?;
    serde_json::from_str::<T>(&body_text)
        .map_err(|e| ApiError::invalid_response(format!("failed to parse JSON from {url}: {e}")))
}

/// Connection settings for the script backend. The base URL is required;
/// the bearer token comes from the external auth collaborator.
#[derive(Clone, Debug)]
pub struct ScriptServiceConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ScriptServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

pub struct HttpScriptService {
    config: ScriptServiceConfig,
    agent: ureq::Agent,
}

impl HttpScriptService {
    pub fn new(config: ScriptServiceConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::configuration(
                "script service base URL is required",
            ));
        }
        let agent = build_agent(config.timeout);
        Ok(Self { config, agent })
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        let start = Instant::now();
        tracing::info!(target: "script_api", "POST {url}");
        let result = post_json(&self.agent, &url, self.config.access_token.as_deref(), body);
        match &result {
            Ok(_) => tracing::info!(
                target: "script_api",
                "POST {url} completed in {:.2?}",
                start.elapsed()
            ),
            Err(err) => tracing::warn!(
                target: "script_api",
                "POST {url} failed after {:.2?}: {err}",
                start.elapsed()
            ),
        }
        result
    }
}

impl ScriptService for HttpScriptService {
    fn generate_scenes(&self, num_scenes: u32, prompt: &str) -> Result<ScriptResponse, ApiError> {
        let body = GenerateScenesRequest {
            num_scenes,
            prompt: prompt.to_string(),
        };
        self.post(GENERATE_SCENES_PATH, &body)
    }

    fn edit_all_scenes(
        &self,
        project_id: &str,
        instruction: &str,
    ) -> Result<ScriptResponse, ApiError> {
        let body = EditAllScenesRequest {
            project_id: project_id.to_string(),
            instruction: instruction.to_string(),
        };
        self.post(EDIT_ALL_SCENES_PATH, &body)
    }

    fn edit_scene(
        &self,
        project_id: &str,
        scene_id: u32,
        instruction: &str,
    ) -> Result<ScriptResponse, ApiError> {
        let body = EditSceneRequest {
            project_id: project_id.to_string(),
            scene_id,
            instruction: instruction.to_string(),
        };
        self.post(EDIT_SCENE_PATH, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_trailing_and_leading_slashes() {
        assert_eq!(
            join_url("http://localhost:8000/", "/api/generate-scenes/"),
            "http://localhost:8000/api/generate-scenes/"
        );
        assert_eq!(
            join_url("http://localhost:8000", "api/edit-scene/"),
            "http://localhost:8000/api/edit-scene/"
        );
    }

    #[test]
    fn empty_base_url_is_rejected_before_any_request() {
        let err = HttpScriptService::new(ScriptServiceConfig::default()).err();
        assert!(matches!(err, Some(ApiError::Configuration(_))));
    }
}
