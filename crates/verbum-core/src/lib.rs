pub mod ai;
pub mod commentary;
pub mod config;
pub mod edition;
pub mod error;
pub mod model;
pub mod navigation;
pub mod selection;
pub mod source;
pub mod store;
pub mod words;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use ai::{OpenAIClient, ProxyCommentary};
pub use commentary::{CommentaryBackend, CommentaryRequest, CommentaryState, TABS};
pub use config::Config;
pub use edition::{Edition, EditionCatalog};
pub use error::{Result, VerbumError};
pub use model::{Book, BookSummary, Chapter, EditionData, Testament, Verse};
pub use navigation::{Cursor, NavigationState};
pub use selection::{Selection, SelectionState};
pub use source::{DirFetcher, EditionFetcher, HttpFetcher, TextSource};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use words::{normalize, words_match};
