mod document;
mod error;
mod orchestrator;
mod session;
mod store;
mod views;

pub use document::{DocumentError, Scene, ScriptDocument};
pub use error::WorkflowError;
pub use orchestrator::{EditOrchestrator, WorkflowEvent, WorkflowOutcome};
pub use session::{
    app_data_dir, load_session, load_session_in, save_session, save_session_in, SessionError,
    WorkflowSnapshot,
};
pub use store::{
    ActiveOperation, GenerationParams, WorkflowStore, ACTIVITY_LOG_CAPACITY, DEFAULT_SCENE_COUNT,
};
pub use views::{EditTarget, SceneView, ScriptOverview, ScriptView};
