use crate::document::{Scene, ScriptDocument};

const PREVIEW_CHARS: usize = 160;

/// The "open edit dialog for scene N" intent. Carries enough to title the
/// dialog; executing the edit stays with the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub scene_number: u32,
    pub scene_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneView {
    pub scene_number: u32,
    pub scene_title: String,
    pub preview: String,
    pub script: String,
    pub story_context: String,
    pub trigger_word: String,
}

impl SceneView {
    fn from_scene(scene: &Scene) -> Self {
        Self {
            scene_number: scene.scene_number,
            scene_title: scene.scene_title.clone(),
            preview: preview_text(&scene.script, PREVIEW_CHARS),
            script: scene.script.clone(),
            story_context: scene.story_context.clone(),
            trigger_word: scene.trigger_word.clone(),
        }
    }

    pub fn edit_target(&self) -> EditTarget {
        EditTarget {
            scene_number: self.scene_number,
            scene_title: self.scene_title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOverview {
    pub project_title: String,
    pub original_prompt: String,
    pub total_scenes: u32,
    pub character_name: Option<String>,
    pub trigger_word: String,
}

/// Pure projection of a script document for display: a document-level
/// overview plus scene cards in narrative order. Holds no state of its own
/// and is re-derived whenever the document changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptView {
    pub overview: ScriptOverview,
    pub scenes: Vec<SceneView>,
}

impl ScriptView {
    pub fn from_document(document: &ScriptDocument) -> Self {
        let character_name = if document.character_exists {
            Some(document.character_name.clone())
        } else {
            None
        };
        Self {
            overview: ScriptOverview {
                project_title: document.project_title.clone(),
                original_prompt: document.original_prompt.clone(),
                total_scenes: document.total_scenes,
                character_name,
                trigger_word: document.trigger_word.clone(),
            },
            scenes: document.scenes.iter().map(SceneView::from_scene).collect(),
        }
    }
}

fn preview_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_index, _)) => format!("{}…", &text[..byte_index].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> ScriptDocument {
        ScriptDocument {
            project_id: "123".to_string(),
            project_title: "Generated from: surviving an earthquake".to_string(),
            original_prompt: "surviving an earthquake".to_string(),
            trigger_word: "princess merida".to_string(),
            character_exists: true,
            character_name: "Merida".to_string(),
            total_scenes: 2,
            scenes: vec![
                Scene {
                    scene_number: 1,
                    scene_title: "Before the Quake".to_string(),
                    script: "princess merida stands in the market.".to_string(),
                    story_context: "princess merida stands in the market.".to_string(),
                    trigger_word: "princess merida".to_string(),
                },
                Scene {
                    scene_number: 2,
                    scene_title: "Riding Out the Quake".to_string(),
                    script: "princess merida stumbles through chaos.".to_string(),
                    story_context: "princess merida stumbles through chaos.".to_string(),
                    trigger_word: "princess merida".to_string(),
                },
            ],
        }
    }

    #[test]
    fn projection_preserves_order_and_fields() {
        let view = ScriptView::from_document(&document());
        assert_eq!(view.overview.total_scenes, 2);
        assert_eq!(view.overview.character_name.as_deref(), Some("Merida"));
        let numbers: Vec<u32> = view.scenes.iter().map(|s| s.scene_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(view.scenes[0].scene_title, "Before the Quake");
    }

    #[test]
    fn missing_character_projects_as_none() {
        let mut doc = document();
        doc.character_exists = false;
        let view = ScriptView::from_document(&doc);
        assert_eq!(view.overview.character_name, None);
    }

    #[test]
    fn edit_target_carries_scene_identity() {
        let view = ScriptView::from_document(&document());
        let target = view.scenes[1].edit_target();
        assert_eq!(target.scene_number, 2);
        assert_eq!(target.scene_title, "Riding Out the Quake");
    }

    #[test]
    fn short_scripts_are_not_truncated() {
        assert_eq!(preview_text("short", 160), "short");
    }

    #[test]
    fn long_scripts_truncate_on_char_boundaries() {
        let text = "é".repeat(200);
        let preview = preview_text(&text, 160);
        assert_eq!(preview.chars().count(), 161);
        assert!(preview.ends_with('…'));
    }
}
