use script_api::{SceneRecord, ScriptPayload};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("declared scene count {declared} does not match {actual} delivered scenes")]
    SceneCountMismatch { declared: u32, actual: usize },

    #[error("duplicate scene number {0}")]
    DuplicateSceneNumber(u32),
}

/// One narrative unit of a script. `scene_number` is the stable identity key
/// used to correlate UI selection with backend edit targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    pub scene_title: String,
    pub script: String,
    pub story_context: String,
    pub trigger_word: String,
}

impl From<SceneRecord> for Scene {
    fn from(record: SceneRecord) -> Self {
        Self {
            scene_number: record.scene_number,
            scene_title: record.scene_title,
            script: record.script,
            story_context: record.story_context,
            trigger_word: record.trigger_word,
        }
    }
}

/// The canonical script artifact: the last successfully acknowledged backend
/// response, validated on conversion. Wholly replaced on every generation or
/// edit; never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDocument {
    pub project_id: String,
    pub project_title: String,
    pub original_prompt: String,
    pub trigger_word: String,
    pub character_exists: bool,
    pub character_name: String,
    pub total_scenes: u32,
    pub scenes: Vec<Scene>,
}

impl ScriptDocument {
    pub fn from_payload(payload: ScriptPayload) -> Result<Self, DocumentError> {
        if payload.total_scenes as usize != payload.scenes.len() {
            return Err(DocumentError::SceneCountMismatch {
                declared: payload.total_scenes,
                actual: payload.scenes.len(),
            });
        }
        let mut seen = HashSet::new();
        for scene in &payload.scenes {
            if !seen.insert(scene.scene_number) {
                return Err(DocumentError::DuplicateSceneNumber(scene.scene_number));
            }
        }
        Ok(Self {
            project_id: payload.project_id,
            project_title: payload.project_title,
            original_prompt: payload.original_prompt,
            trigger_word: payload.trigger_word,
            character_exists: payload.character_exists,
            character_name: payload.character_name,
            total_scenes: payload.total_scenes,
            scenes: payload.scenes.into_iter().map(Scene::from).collect(),
        })
    }

    /// Lookup by identity, never by index: scene numbers are conventionally
    /// contiguous from 1 but nothing here relies on that.
    pub fn find_scene(&self, scene_number: u32) -> Option<&Scene> {
        self.scenes
            .iter()
            .find(|scene| scene.scene_number == scene_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with(total: u32, numbers: &[u32]) -> ScriptPayload {
        ScriptPayload {
            project_id: "123".to_string(),
            project_title: "Test".to_string(),
            original_prompt: "test prompt".to_string(),
            trigger_word: "princess merida".to_string(),
            character_exists: true,
            character_name: "Merida".to_string(),
            total_scenes: total,
            scenes: numbers
                .iter()
                .map(|&n| SceneRecord {
                    scene_number: n,
                    scene_title: format!("Scene {n}"),
                    script: format!("script {n}"),
                    story_context: format!("context {n}"),
                    trigger_word: "princess merida".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = ScriptDocument::from_payload(payload_with(3, &[1, 2])).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::SceneCountMismatch {
                declared: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn duplicate_scene_numbers_are_rejected() {
        let err = ScriptDocument::from_payload(payload_with(3, &[1, 2, 2])).unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateSceneNumber(2)));
    }

    #[test]
    fn lookup_is_by_identity_not_index() {
        let document = ScriptDocument::from_payload(payload_with(3, &[4, 9, 2])).unwrap();
        assert_eq!(document.find_scene(9).unwrap().scene_title, "Scene 9");
        assert_eq!(document.find_scene(2).unwrap().scene_title, "Scene 2");
        assert!(document.find_scene(1).is_none());
    }
}
