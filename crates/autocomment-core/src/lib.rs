pub mod chunks;
mod commenter;
pub mod error;
pub mod prompts;
pub mod services;
mod shared;

pub use commenter::{
    apply_output, Commenter, CommenterConfig, FileOutcome, RunOutcome,
};
pub use error::{CommenterError, Result};
pub use shared::languages::{
    get_language_by_slug, LanguageProfile, DEFAULT_LANGUAGE_SLUG, LANGUAGES,
};
pub use shared::report::RunReport;
