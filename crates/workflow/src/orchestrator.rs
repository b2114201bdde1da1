use crate::document::ScriptDocument;
use crate::error::WorkflowError;
use crate::store::{ActiveOperation, GenerationParams, WorkflowStore};
use crossbeam_channel::{unbounded, Receiver, Sender};
use script_api::{ApiError, ScriptService};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Completion report for one backend request, sent by the worker thread that
/// performed it. Carries everything the reconciliation step needs to decide
/// whether the response still applies.
pub enum WorkflowEvent {
    GenerationFinished {
        op_id: Uuid,
        params: GenerationParams,
        result: Result<ScriptDocument, ApiError>,
    },
    EditAllFinished {
        op_id: Uuid,
        project_id: String,
        result: Result<ScriptDocument, ApiError>,
    },
    EditSceneFinished {
        op_id: Uuid,
        project_id: String,
        scene_number: u32,
        scene_title: String,
        result: Result<ScriptDocument, ApiError>,
    },
}

impl std::fmt::Debug for WorkflowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowEvent::GenerationFinished { .. } => {
                f.write_str("WorkflowEvent::GenerationFinished(..)")
            }
            WorkflowEvent::EditAllFinished { .. } => {
                f.write_str("WorkflowEvent::EditAllFinished(..)")
            }
            WorkflowEvent::EditSceneFinished { .. } => {
                f.write_str("WorkflowEvent::EditSceneFinished(..)")
            }
        }
    }
}

/// What reconciling one event did to the store. `Failed` is the only variant
/// the view layer should surface to the user.
#[derive(Debug)]
pub enum WorkflowOutcome {
    DocumentReplaced,
    Failed(WorkflowError),
    StaleResponseDiscarded,
}

/// The single write path to the script backend. Validates locally, marks the
/// store busy, runs each request on a worker thread, and reconciles the
/// response back into the store when the caller pumps the event channel.
pub struct EditOrchestrator {
    service: Arc<dyn ScriptService>,
    tx: Sender<WorkflowEvent>,
    rx: Receiver<WorkflowEvent>,
}

impl EditOrchestrator {
    pub fn new(service: Arc<dyn ScriptService>) -> Self {
        let (tx, rx) = unbounded();
        Self { service, tx, rx }
    }

    fn reject_if_busy(store: &WorkflowStore) -> Result<(), WorkflowError> {
        if let Some(active) = store.active_operation() {
            return Err(WorkflowError::OperationInFlight(active.describe()));
        }
        Ok(())
    }

    /// Issues a generate request for the store's current prompt and scene
    /// count. The issued parameters travel with the request; the response is
    /// discarded if they no longer match the store when it arrives.
    pub fn generate(&self, store: &mut WorkflowStore) -> Result<(), WorkflowError> {
        Self::reject_if_busy(store)?;
        let prompt = store.main_prompt().trim().to_string();
        if prompt.is_empty() {
            return Err(WorkflowError::EmptyPrompt);
        }
        let scene_count = store.scene_count();
        if scene_count < 1 {
            return Err(WorkflowError::InvalidSceneCount(scene_count));
        }
        let params = GenerationParams {
            prompt,
            scene_count,
        };
        let op_id = Uuid::new_v4();
        store.begin(ActiveOperation::Generating {
            op_id,
            params: params.clone(),
        })?;
        store.push_activity(format!("Generating a {scene_count}-scene script…"));
        tracing::info!(target: "workflow", %op_id, "generate request: {scene_count} scenes");
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let started = Instant::now();
            let result = service
                .generate_scenes(params.scene_count, &params.prompt)
                .and_then(convert_response);
            match &result {
                Ok(document) => tracing::info!(
                    target: "workflow",
                    %op_id,
                    "generate completed in {:.2?} ({} scenes)",
                    started.elapsed(),
                    document.scenes.len()
                ),
                Err(err) => tracing::warn!(
                    target: "workflow",
                    %op_id,
                    "generate failed after {:.2?}: {err}",
                    started.elapsed()
                ),
            }
            send_event(
                &tx,
                WorkflowEvent::GenerationFinished {
                    op_id,
                    params,
                    result,
                },
            );
        });
        Ok(())
    }

    /// Derived-state recomputation: issues a generate call iff no document is
    /// present, nothing is in flight, and the prompt is non-empty. The
    /// embedding loop calls this every tick; together with the setters'
    /// invalidation rule it re-generates whenever the parameters change.
    /// Returns whether a request was issued.
    pub fn ensure_generated(&self, store: &mut WorkflowStore) -> Result<bool, WorkflowError> {
        if store.is_busy() || store.document().is_some() {
            return Ok(false);
        }
        if store.main_prompt().trim().is_empty() {
            return Ok(false);
        }
        self.generate(store)?;
        Ok(true)
    }

    /// Applies one instruction to every scene, against the stored document's
    /// project.
    pub fn edit_all(
        &self,
        store: &mut WorkflowStore,
        instruction: &str,
    ) -> Result<(), WorkflowError> {
        Self::reject_if_busy(store)?;
        let document = store.document().ok_or(WorkflowError::NoDocument)?;
        let instruction = instruction.trim().to_string();
        if instruction.is_empty() {
            return Err(WorkflowError::EmptyInstruction);
        }
        let project_id = document.project_id.clone();
        let op_id = Uuid::new_v4();
        store.begin(ActiveOperation::EditingAll {
            op_id,
            project_id: project_id.clone(),
        })?;
        store.push_activity("Editing all scenes…");
        tracing::info!(target: "workflow", %op_id, "edit-all request for project {project_id}");
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let started = Instant::now();
            let result = service
                .edit_all_scenes(&project_id, &instruction)
                .and_then(convert_response);
            log_completion("edit-all", op_id, started, &result);
            send_event(
                &tx,
                WorkflowEvent::EditAllFinished {
                    op_id,
                    project_id,
                    result,
                },
            );
        });
        Ok(())
    }

    /// Applies one instruction to a single scene, selected by its stable
    /// scene number. The backend still returns the whole document.
    pub fn edit_scene(
        &self,
        store: &mut WorkflowStore,
        scene_number: u32,
        instruction: &str,
    ) -> Result<(), WorkflowError> {
        Self::reject_if_busy(store)?;
        let document = store.document().ok_or(WorkflowError::NoDocument)?;
        let scene = document
            .find_scene(scene_number)
            .ok_or(WorkflowError::UnknownScene(scene_number))?;
        let scene_title = scene.scene_title.clone();
        let instruction = instruction.trim().to_string();
        if instruction.is_empty() {
            return Err(WorkflowError::EmptyInstruction);
        }
        let project_id = document.project_id.clone();
        let op_id = Uuid::new_v4();
        store.begin(ActiveOperation::EditingScene {
            op_id,
            project_id: project_id.clone(),
            scene_number,
        })?;
        store.push_activity(format!("Editing scene {scene_number}…"));
        tracing::info!(
            target: "workflow",
            %op_id,
            "edit-scene request for project {project_id}, scene {scene_number}"
        );
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let started = Instant::now();
            let result = service
                .edit_scene(&project_id, scene_number, &instruction)
                .and_then(convert_response);
            log_completion("edit-scene", op_id, started, &result);
            send_event(
                &tx,
                WorkflowEvent::EditSceneFinished {
                    op_id,
                    project_id,
                    scene_number,
                    scene_title,
                    result,
                },
            );
        });
        Ok(())
    }

    /// Drains all completed operations and reconciles them into the store.
    /// Call from the embedding event loop.
    pub fn poll(&self, store: &mut WorkflowStore) -> Vec<WorkflowOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            outcomes.push(self.handle_event(store, event));
        }
        outcomes
    }

    /// Blocks until the next completion arrives (or the timeout passes) and
    /// reconciles it. For headless callers and tests; interactive loops use
    /// `poll`.
    pub fn wait(&self, store: &mut WorkflowStore, timeout: Duration) -> Option<WorkflowOutcome> {
        self.rx
            .recv_timeout(timeout)
            .ok()
            .map(|event| self.handle_event(store, event))
    }

    pub fn handle_event(&self, store: &mut WorkflowStore, event: WorkflowEvent) -> WorkflowOutcome {
        tracing::debug!(target: "workflow", "handle_event {:?}", event);
        match event {
            WorkflowEvent::GenerationFinished {
                op_id,
                params,
                result,
            } => {
                if !store.finish_matching(op_id) {
                    tracing::info!(target: "workflow", %op_id, "discarding superseded generation response");
                    return WorkflowOutcome::StaleResponseDiscarded;
                }
                match result {
                    Ok(document) => {
                        let current = GenerationParams {
                            prompt: store.main_prompt().trim().to_string(),
                            scene_count: store.scene_count(),
                        };
                        if current != params {
                            tracing::info!(
                                target: "workflow",
                                %op_id,
                                "discarding stale generation response (parameters changed)"
                            );
                            store.push_activity("Discarded an outdated script response.");
                            return WorkflowOutcome::StaleResponseDiscarded;
                        }
                        store.push_activity(format!(
                            "Generated {} scenes.",
                            document.scenes.len()
                        ));
                        store.replace_document(document);
                        WorkflowOutcome::DocumentReplaced
                    }
                    Err(source) => {
                        store.push_activity("Script generation failed.");
                        WorkflowOutcome::Failed(WorkflowError::GenerationFailed { source })
                    }
                }
            }
            WorkflowEvent::EditAllFinished {
                op_id,
                project_id,
                result,
            } => {
                if !store.finish_matching(op_id) {
                    tracing::info!(target: "workflow", %op_id, "discarding superseded edit-all response");
                    return WorkflowOutcome::StaleResponseDiscarded;
                }
                match result {
                    Ok(document) => self.apply_edit(store, op_id, &project_id, document, || {
                        "Applied edit to all scenes.".to_string()
                    }),
                    Err(source) => {
                        store.push_activity("Editing all scenes failed.");
                        WorkflowOutcome::Failed(WorkflowError::EditAllFailed { source })
                    }
                }
            }
            WorkflowEvent::EditSceneFinished {
                op_id,
                project_id,
                scene_number,
                scene_title,
                result,
            } => {
                if !store.finish_matching(op_id) {
                    tracing::info!(target: "workflow", %op_id, "discarding superseded edit-scene response");
                    return WorkflowOutcome::StaleResponseDiscarded;
                }
                match result {
                    Ok(document) => self.apply_edit(store, op_id, &project_id, document, || {
                        format!("Applied edit to scene {scene_number}.")
                    }),
                    Err(source) => {
                        store.push_activity(format!("Editing scene {scene_number} failed."));
                        WorkflowOutcome::Failed(WorkflowError::EditSceneFailed {
                            scene_number,
                            scene_title,
                            source,
                        })
                    }
                }
            }
        }
    }

    /// An edit response only applies while the store still holds the document
    /// it was issued against; a parameter change in between invalidated that
    /// document, and resurrecting it here would overwrite newer intent.
    fn apply_edit(
        &self,
        store: &mut WorkflowStore,
        op_id: Uuid,
        project_id: &str,
        document: ScriptDocument,
        activity: impl FnOnce() -> String,
    ) -> WorkflowOutcome {
        let still_current = store
            .document()
            .map(|current| current.project_id == project_id)
            .unwrap_or(false);
        if !still_current {
            tracing::info!(
                target: "workflow",
                %op_id,
                "discarding stale edit response for abandoned project {project_id}"
            );
            return WorkflowOutcome::StaleResponseDiscarded;
        }
        store.push_activity(activity());
        store.replace_document(document);
        WorkflowOutcome::DocumentReplaced
    }
}

fn convert_response(response: script_api::ScriptResponse) -> Result<ScriptDocument, ApiError> {
    tracing::debug!(
        target: "workflow",
        status = %response.status,
        "backend message: {}",
        response.message
    );
    ScriptDocument::from_payload(response.data)
        .map_err(|err| ApiError::invalid_response(err.to_string()))
}

fn send_event(tx: &Sender<WorkflowEvent>, event: WorkflowEvent) {
    if let Err(err) = tx.send(event) {
        tracing::error!(target: "workflow", "failed to send workflow event: {err}");
    }
}

fn log_completion(
    label: &str,
    op_id: Uuid,
    started: Instant,
    result: &Result<ScriptDocument, ApiError>,
) {
    match result {
        Ok(_) => tracing::info!(
            target: "workflow",
            %op_id,
            "{label} completed in {:.2?}",
            started.elapsed()
        ),
        Err(err) => tracing::warn!(
            target: "workflow",
            %op_id,
            "{label} failed after {:.2?}: {err}",
            started.elapsed()
        ),
    }
}
