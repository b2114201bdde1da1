use script_api::ApiError;
use thiserror::Error;

/// Everything that can go wrong in the script workflow. Validation and
/// concurrency variants are raised before any network call; the failure
/// variants wrap backend errors and are scoped so the view layer can surface
/// them against the right target.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("scene count must be at least 1 (got {0})")]
    InvalidSceneCount(u32),

    #[error("instruction cannot be empty")]
    EmptyInstruction,

    #[error("no script has been generated yet")]
    NoDocument,

    #[error("scene {0} does not exist in the current script")]
    UnknownScene(u32),

    #[error("another operation is in flight: {0}")]
    OperationInFlight(&'static str),

    #[error("error generating script: {source}")]
    GenerationFailed {
        #[source]
        source: ApiError,
    },

    #[error("error editing all scenes of the script: {source}")]
    EditAllFailed {
        #[source]
        source: ApiError,
    },

    #[error("error editing scene {scene_number} ({scene_title}) of the script: {source}")]
    EditSceneFailed {
        scene_number: u32,
        scene_title: String,
        #[source]
        source: ApiError,
    },
}
