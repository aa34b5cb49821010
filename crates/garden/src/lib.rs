//! garden-publish: publishes Obsidian notes to a digital garden repository.
//!
//! Each note flagged `dg-publish: true` is assembled into a self-contained
//! document (embeds inlined, links made explicit, images inlined, frontmatter
//! normalized) and compared by git blob fingerprint against the remote
//! manifest to decide what is new, changed, unchanged or orphaned.

pub mod assembler;
pub mod comments;
pub mod config;
pub mod drawing;
pub mod fence;
pub mod fingerprint;
pub mod frontmatter;
pub mod links;
pub mod media;
pub mod publisher;
pub mod query;
pub mod remote;
pub mod settings;
pub mod status;
pub mod transclusion;
pub mod vault;

// Re-export key types for convenience
pub use assembler::{AssembleError, Assembler};
pub use config::{Config, ConfigError};
pub use fingerprint::Fingerprint;
pub use publisher::{BatchOutcome, Publisher};
pub use query::{QueryEngine, QueryError};
pub use remote::{remote_path, DirectoryRemote, Manifest, RemoteError, RemoteRepository};
pub use settings::{NoteSettings, PublishSettings, RemoteIdentity, SettingsError};
pub use status::{PublishStatus, PublishStatusManager, StatusError};
pub use vault::{DocumentKind, FileVault, InMemoryVault, LinkTarget, MetadataIndex, Note, NoteStore, StoreError};
