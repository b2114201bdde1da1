use crate::error::ApiError;
use crate::types::ScriptResponse;

/// Backend script service reached by the workflow layer. Calls are blocking;
/// callers run them on worker threads and report back over an event channel.
pub trait ScriptService: Send + Sync {
    fn generate_scenes(&self, num_scenes: u32, prompt: &str) -> Result<ScriptResponse, ApiError>;

    fn edit_all_scenes(
        &self,
        project_id: &str,
        instruction: &str,
    ) -> Result<ScriptResponse, ApiError>;

    fn edit_scene(
        &self,
        project_id: &str,
        scene_id: u32,
        instruction: &str,
    ) -> Result<ScriptResponse, ApiError>;
}
