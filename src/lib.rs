pub mod app_state;
pub mod constants;
pub mod gemini;
pub mod prompt;
pub mod schema;
pub mod smbp;
pub mod web_server;

pub use app_state::{Phase, Submission, Workbench};
pub use gemini::{GeminiClient, GeminiConfig, GenerationError};
pub use schema::{Connection, ElementKind, LadderElement, LogicResponse, Rung, SchemaError, Variable};
