use crate::document::ScriptDocument;
use crate::error::WorkflowError;
use std::collections::VecDeque;
use uuid::Uuid;

pub const DEFAULT_SCENE_COUNT: u32 = 3;
pub const ACTIVITY_LOG_CAPACITY: usize = 16;

/// The generation inputs captured when a generate request is issued, compared
/// against the store when its response arrives (stale-response guard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub prompt: String,
    pub scene_count: u32,
}

/// The single operation allowed in flight at a time. One enum instead of
/// separate busy flags, so mutual exclusion holds by construction.
#[derive(Debug, Clone)]
pub enum ActiveOperation {
    Generating {
        op_id: Uuid,
        params: GenerationParams,
    },
    EditingAll {
        op_id: Uuid,
        project_id: String,
    },
    EditingScene {
        op_id: Uuid,
        project_id: String,
        scene_number: u32,
    },
}

impl ActiveOperation {
    pub fn op_id(&self) -> Uuid {
        match self {
            ActiveOperation::Generating { op_id, .. }
            | ActiveOperation::EditingAll { op_id, .. }
            | ActiveOperation::EditingScene { op_id, .. } => *op_id,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ActiveOperation::Generating { .. } => "generating script",
            ActiveOperation::EditingAll { .. } => "editing all scenes",
            ActiveOperation::EditingScene { .. } => "editing a scene",
        }
    }
}

/// Single source of truth for the script workflow: generation parameters,
/// the current document, and the in-flight operation. Owned by the embedding
/// view layer and handed to the orchestrator by `&mut`; the orchestrator is
/// the only writer-through-caller.
#[derive(Debug)]
pub struct WorkflowStore {
    pub(crate) main_prompt: String,
    pub(crate) scene_count: u32,
    pub(crate) document: Option<ScriptDocument>,
    pub(crate) active: Option<ActiveOperation>,
    pub(crate) activity: VecDeque<String>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self {
            main_prompt: String::new(),
            scene_count: DEFAULT_SCENE_COUNT,
            document: None,
            active: None,
            activity: VecDeque::with_capacity(ACTIVITY_LOG_CAPACITY),
        }
    }

    pub fn main_prompt(&self) -> &str {
        &self.main_prompt
    }

    pub fn scene_count(&self) -> u32 {
        self.scene_count
    }

    pub fn document(&self) -> Option<&ScriptDocument> {
        self.document.as_ref()
    }

    pub fn active_operation(&self) -> Option<&ActiveOperation> {
        self.active.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Changing the prompt while a document is present discards it; the
    /// embedding loop's `ensure_generated` then re-triggers generation.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        if prompt == self.main_prompt {
            return;
        }
        self.main_prompt = prompt;
        if self.document.take().is_some() {
            self.push_activity("Prompt changed; current script discarded.");
        }
    }

    /// Counts below 1 are clamped to 1. Same invalidation rule as
    /// `set_prompt`.
    pub fn set_scene_count(&mut self, scene_count: u32) {
        let scene_count = scene_count.max(1);
        if scene_count == self.scene_count {
            return;
        }
        self.scene_count = scene_count;
        if self.document.take().is_some() {
            self.push_activity("Scene count changed; current script discarded.");
        }
    }

    /// Atomic swap; partial documents are never merged in.
    pub fn replace_document(&mut self, document: ScriptDocument) {
        self.document = Some(document);
    }

    pub fn clear_document(&mut self) {
        self.document = None;
    }

    pub fn begin(&mut self, op: ActiveOperation) -> Result<(), WorkflowError> {
        if let Some(active) = &self.active {
            return Err(WorkflowError::OperationInFlight(active.describe()));
        }
        self.active = Some(op);
        Ok(())
    }

    /// Clears the active operation only when `op_id` matches it. A stale
    /// completion (after `reset`, or superseded by a newer operation) leaves
    /// the current operation untouched and returns `false`.
    pub fn finish_matching(&mut self, op_id: Uuid) -> bool {
        match &self.active {
            Some(active) if active.op_id() == op_id => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn push_activity(&mut self, message: impl Into<String>) {
        if self.activity.len() == ACTIVITY_LOG_CAPACITY {
            self.activity.pop_front();
        }
        self.activity.push_back(message.into());
    }

    pub fn activity(&self) -> impl Iterator<Item = &str> {
        self.activity.iter().map(String::as_str)
    }

    /// Back to the initial state. Responses from an operation that was in
    /// flight at reset time no longer match and are discarded on arrival.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new()
    }
}
