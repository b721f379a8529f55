pub mod clean;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod locate;
pub mod messages;
pub mod orchestrator;
pub mod transform;

pub use orchestrator::{Pipeline, PipelineResult};
