//! Infrastructure layer: concrete implementations of the domain's
//! repository traits.

pub mod chain;
pub mod credentials;
pub mod prompt;
pub mod run;

pub use chain::InMemoryChainRepository;
pub use credentials::InMemoryCredentialRepository;
pub use prompt::InMemoryPromptVersionRepository;
pub use run::InMemoryRunRepository;
