//! Prompt versions and their batch resolution for runs

pub mod entity;
pub mod repository;
pub mod resolver;

pub use entity::PromptVersion;
pub use repository::PromptVersionRepository;
pub use resolver::{PromptVersionResolver, ResolvedPromptVersions};
