//! Industry Knowledge Folder Registry
//!
//! Contributors submit named file records (metadata plus a content
//! fingerprint), the administrator reviews each submission, and approved
//! submissions are rewarded with knowledge tokens minted to the contributor.
//!
//! Lifecycle: `Pending` → `Approved` (terminal) or `Rejected`; the owner may
//! resubmit a rejected file, which returns it to `Pending`.

pub mod access;
pub mod errors;
pub mod events;
pub mod index;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod workflow;

pub use errors::*;
pub use events::{EventLog, EventRecord, RegistryEvent};
pub use registry::KnowledgeRegistry;
pub use snapshot::RegistrySnapshot;
pub use types::*;
