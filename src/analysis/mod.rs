pub mod analyzer;
pub mod extract;
pub mod prompt;
pub mod types;

pub use analyzer::Analyzer;
pub use extract::{Extraction, extract, strip_code_fences};
pub use prompt::build_prompt;
pub use types::*;
