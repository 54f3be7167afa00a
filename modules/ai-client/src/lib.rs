//! Structured JSON extraction against hosted LLM providers.
//!
//! Every provider implements [`JsonAgent`]: one system prompt, one user
//! prompt, one JSON schema in; one JSON value out. Decoding the value into a
//! typed response is left to the caller so it can decide what a bad shape
//! means for its own workflow.

pub mod claude;
pub mod error;
pub mod gemini;
pub mod schema;
pub mod traits;
pub mod util;

pub use error::ApiError;
pub use schema::StructuredOutput;
pub use traits::{ExtractOptions, JsonAgent, JsonRequest};
