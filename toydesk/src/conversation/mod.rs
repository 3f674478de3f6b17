pub mod memory;

pub use memory::{format_conversation_memory, MemoryWindow, MEMORY_SENTINEL};
