mod auth;
mod error;
mod http;
mod mock;
mod service;
mod types;

pub use auth::{login, logout, AuthError, TokenPair};
pub use error::ApiError;
pub use http::{HttpScriptService, ScriptServiceConfig};
pub use mock::{MockConfig, MockScriptService};
pub use service::ScriptService;
pub use types::{
    EditAllScenesRequest, EditSceneRequest, GenerateScenesRequest, SceneRecord, ScriptPayload,
    ScriptResponse,
};
