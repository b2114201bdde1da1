use crate::error::ApiError;
use crate::service::ScriptService;
use crate::types::{SceneRecord, ScriptPayload, ScriptResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub trigger_word: String,
    pub character_name: String,
    pub character_exists: bool,
    /// When set, `generate_scenes` returns this payload verbatim (with its
    /// own project id) instead of a synthesized document.
    pub script_stub: Option<ScriptPayload>,
    pub fail_requests: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            trigger_word: "princess merida".to_string(),
            character_name: "Merida".to_string(),
            character_exists: true,
            script_stub: None,
            fail_requests: false,
        }
    }
}

/// In-process stand-in for the script backend. Keeps per-project state so
/// that successive edits compose, and counts calls so tests can assert that
/// rejected operations never reached the service.
pub struct MockScriptService {
    config: MockConfig,
    fail_requests: AtomicBool,
    calls: AtomicUsize,
    projects: Mutex<HashMap<String, ScriptPayload>>,
}

impl MockScriptService {
    pub fn new(config: MockConfig) -> Self {
        let fail = config.fail_requests;
        Self {
            config,
            fail_requests: AtomicBool::new(fail),
            calls: AtomicUsize::new(0),
            projects: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                code: 500,
                body: "mock backend failure".to_string(),
            });
        }
        Ok(())
    }

    fn scene_title(prompt: &str, number: u32) -> String {
        if prompt.to_ascii_lowercase().contains("earthquake") {
            match number {
                1 => return "Before the Quake".to_string(),
                2 => return "Riding Out the Quake".to_string(),
                _ => {}
            }
        }
        format!("Scene {number}")
    }

    fn synthesize(&self, num_scenes: u32, prompt: &str) -> ScriptPayload {
        let scenes = (1..=num_scenes)
            .map(|number| {
                let script = format!(
                    "{} stands at the heart of a story about {}. This is beat {} of {}.",
                    self.config.trigger_word, prompt, number, num_scenes
                );
                SceneRecord {
                    scene_number: number,
                    scene_title: Self::scene_title(prompt, number),
                    story_context: script.clone(),
                    script,
                    trigger_word: self.config.trigger_word.clone(),
                }
            })
            .collect();
        ScriptPayload {
            project_id: Uuid::new_v4().to_string(),
            project_title: format!("Generated from: {prompt}"),
            original_prompt: prompt.to_string(),
            trigger_word: self.config.trigger_word.clone(),
            character_exists: self.config.character_exists,
            character_name: self.config.character_name.clone(),
            total_scenes: num_scenes,
            scenes,
        }
    }
}

impl Default for MockScriptService {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl ScriptService for MockScriptService {
    fn generate_scenes(&self, num_scenes: u32, prompt: &str) -> Result<ScriptResponse, ApiError> {
        self.check_available()?;
        let payload = match &self.config.script_stub {
            Some(stub) => stub.clone(),
            None => self.synthesize(num_scenes, prompt),
        };
        self.projects
            .lock()
            .map_err(|_| ApiError::transport("mock project table poisoned"))?
            .insert(payload.project_id.clone(), payload.clone());
        Ok(ScriptResponse {
            status: "success".to_string(),
            message: format!(
                "Generated {} scenes from script generation workflow.",
                payload.total_scenes
            ),
            data: payload,
        })
    }

    fn edit_all_scenes(
        &self,
        project_id: &str,
        instruction: &str,
    ) -> Result<ScriptResponse, ApiError> {
        self.check_available()?;
        let mut projects = self
            .projects
            .lock()
            .map_err(|_| ApiError::transport("mock project table poisoned"))?;
        let payload = projects.get_mut(project_id).ok_or_else(|| ApiError::Status {
            code: 404,
            body: format!("unknown project {project_id}"),
        })?;
        for scene in &mut payload.scenes {
            scene.script = format!("{} Edit applied: {instruction}.", scene.script);
            scene.story_context = scene.script.clone();
        }
        Ok(ScriptResponse {
            status: "success".to_string(),
            message: "Applied edit to all scenes.".to_string(),
            data: payload.clone(),
        })
    }

    fn edit_scene(
        &self,
        project_id: &str,
        scene_id: u32,
        instruction: &str,
    ) -> Result<ScriptResponse, ApiError> {
        self.check_available()?;
        let mut projects = self
            .projects
            .lock()
            .map_err(|_| ApiError::transport("mock project table poisoned"))?;
        let payload = projects.get_mut(project_id).ok_or_else(|| ApiError::Status {
            code: 404,
            body: format!("unknown project {project_id}"),
        })?;
        let scene = payload
            .scenes
            .iter_mut()
            .find(|scene| scene.scene_number == scene_id)
            .ok_or_else(|| ApiError::Status {
                code: 404,
                body: format!("unknown scene {scene_id}"),
            })?;
        scene.script = format!("{} Edit applied: {instruction}.", scene.script);
        scene.story_context = scene.script.clone();
        Ok(ScriptResponse {
            status: "success".to_string(),
            message: format!("Applied edit to scene {scene_id}."),
            data: payload.clone(),
        })
    }
}
