use serde::{Deserialize, Serialize};

/// Envelope returned by every script endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptResponse {
    pub status: String,
    pub message: String,
    pub data: ScriptPayload,
}

/// The full script record owned by the backend. Every operation returns the
/// whole payload; partial documents are never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPayload {
    pub project_id: String,
    pub project_title: String,
    pub original_prompt: String,
    pub trigger_word: String,
    pub character_exists: bool,
    pub character_name: String,
    pub total_scenes: u32,
    pub scenes: Vec<SceneRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub scene_number: u32,
    pub scene_title: String,
    pub script: String,
    pub story_context: String,
    pub trigger_word: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateScenesRequest {
    pub num_scenes: u32,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditAllScenesRequest {
    pub project_id: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditSceneRequest {
    pub project_id: String,
    pub scene_id: u32,
    pub instruction: String,
}
