//! Chain definitions, snapshots, variable resolution, and message building

pub mod entity;
pub mod messages;
pub mod repository;
pub mod snapshot;
pub mod variables;

pub use entity::{Chain, ChainNode, MessageSource, MessageSpec, VariableMapping};
pub use messages::build_messages;
pub use repository::ChainRepository;
pub use snapshot::{ChainSnapshotLoader, NodeSnapshot, ResolvedNode};
pub use variables::resolve_variables;
