//! Reference documents injected into every support prompt, and the TTL cache
//! that keeps them.

mod cache;
mod loader;

pub use cache::{CacheState, CacheStatus, ContextCache, ContextLookup, ContextState};
pub use loader::{
    build_loader, ContextDocuments, ContextLoader, FileContextLoader, HttpContextLoader,
    DOCUMENT_NAMES,
};
