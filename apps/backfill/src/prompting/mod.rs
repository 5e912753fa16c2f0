// Prompt construction: template loading, per-record rendering, enrichment.
// Pure functions only; the agent and the table are handled by the processor.

pub mod builder;
pub mod enrich;
pub mod prompts;
pub mod template;

pub use builder::{ColumnRef, PromptRequest, PromptSource};
pub use enrich::enrich_prompt;
pub use template::load_template;
