//! Lore persistence
//!
//! - Record types and the store contract shared by every host
//! - In-memory store (headless host, tests)
//! - HTTP client for the lore endpoint (browser only)

#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod lore;

#[cfg(target_arch = "wasm32")]
pub use http::HttpLoreStore;
pub use lore::{
    Codex, LoreEntry, LoreError, LoreStore, MemoryLoreStore, NewLore, SaveOutcome,
};
