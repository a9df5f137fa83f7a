//! Edition text loading with process memo and persistent cache

use crate::error::{Result, VerbumError};
use crate::model::{BookSummary, Chapter, EditionData, Verse};
use crate::store::{KeyValueStore, EDITION_KEY_PREFIX};
use futures_util::future::BoxFuture;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Retrieves the raw JSON document of an edition
pub trait EditionFetcher: Send + Sync {
    fn fetch<'a>(&'a self, edition_id: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Fetches `GET {base_url}/bibles/{id}.json`
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, edition_id: &str) -> String {
        format!("{}/bibles/{}.json", self.base_url, edition_id)
    }
}

impl EditionFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, edition_id: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let url = self.url_for(edition_id);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| VerbumError::NotFound(format!("edition {}: {}", edition_id, e)))?;

            if !response.status().is_success() {
                return Err(VerbumError::NotFound(format!(
                    "edition {} ({})",
                    edition_id,
                    response.status()
                )));
            }

            response
                .text()
                .await
                .map_err(|e| VerbumError::NotFound(format!("edition {}: {}", edition_id, e)))
        })
    }
}

/// Reads `{dir}/{id}.json` from disk
#[derive(Clone)]
pub struct DirFetcher {
    dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl EditionFetcher for DirFetcher {
    fn fetch<'a>(&'a self, edition_id: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let path = self.dir.join(format!("{}.json", edition_id));
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| VerbumError::NotFound(format!("edition {} at {:?}: {}", edition_id, path, e)))
        })
    }
}

pub struct TextSource {
    fetcher: Arc<dyn EditionFetcher>,
    store: Arc<dyn KeyValueStore>,
    editions: RwLock<HashMap<String, Arc<EditionData>>>,
}

impl TextSource {
    pub fn new(fetcher: Arc<dyn EditionFetcher>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            fetcher,
            store,
            editions: RwLock::new(HashMap::new()),
        }
    }

    /// Full edition data: process memo, then persistent store, then fetcher
    pub async fn edition(&self, edition_id: &str) -> Result<Arc<EditionData>> {
        if let Some(data) = self.editions.read().await.get(edition_id) {
            return Ok(Arc::clone(data));
        }

        let key = format!("{}{}", EDITION_KEY_PREFIX, edition_id);
        if let Some(data) = self.load_persisted(&key) {
            debug!(edition = edition_id, "edition restored from local store");
            return Ok(self.remember(edition_id, data).await);
        }

        debug!(edition = edition_id, "fetching edition");
        let json = self.fetcher.fetch(edition_id).await?;
        let data = EditionData::from_json(&json).map_err(|e| {
            VerbumError::NotFound(format!("edition {}: invalid document: {}", edition_id, e))
        })?;

        if let Err(e) = self.store.set(&key, &json) {
            warn!(edition = edition_id, error = %e, "failed to persist edition");
        }

        Ok(self.remember(edition_id, data).await)
    }

    fn load_persisted(&self, key: &str) -> Option<EditionData> {
        match self.store.get(key) {
            Ok(Some(json)) => match EditionData::from_json(&json) {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!(key, error = %e, "discarding unreadable cached edition");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "local store read failed, treating as miss");
                None
            }
        }
    }

    async fn remember(&self, edition_id: &str, data: EditionData) -> Arc<EditionData> {
        let mut editions = self.editions.write().await;
        Arc::clone(
            editions
                .entry(edition_id.to_string())
                .or_insert_with(|| Arc::new(data)),
        )
    }

    pub async fn is_loaded(&self, edition_id: &str) -> bool {
        self.editions.read().await.contains_key(edition_id)
    }

    pub async fn book_summaries(&self, edition_id: &str) -> Result<Vec<BookSummary>> {
        Ok(self.edition(edition_id).await?.summaries())
    }

    pub async fn chapter(&self, edition_id: &str, book: &str, chapter: u32) -> Result<Chapter> {
        let data = self.edition(edition_id).await?;
        let book_data = data
            .book(book)
            .ok_or_else(|| VerbumError::BookNotFound(book.to_string()))?;
        book_data
            .chapter(chapter)
            .cloned()
            .ok_or_else(|| VerbumError::ChapterNotFound {
                book: book.to_string(),
                chapter,
            })
    }

    /// Verse lookup by book ordinal, for editions whose book names differ
    pub async fn verse_by_ordinal(
        &self,
        edition_id: &str,
        ordinal: u32,
        chapter: u32,
        verse: u32,
    ) -> Result<Verse> {
        let data = self.edition(edition_id).await?;
        let book = data
            .book_by_ordinal(ordinal)
            .ok_or_else(|| VerbumError::BookNotFound(format!("#{} in {}", ordinal, edition_id)))?;
        let chapter_data = book.chapter(chapter).ok_or_else(|| VerbumError::ChapterNotFound {
            book: book.name.clone(),
            chapter,
        })?;
        chapter_data
            .verse(verse)
            .cloned()
            .ok_or_else(|| VerbumError::NotFound(format!("{} {}:{}", book.name, chapter, verse)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::serve_canned;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DOC: &str = r#"{"books": [
        {"name": "Genesis", "chapters": [
            {"chapter": 1, "verses": [{"verse": 1, "text": "In principio creavit Deus caelum et terram."}]}
        ]}
    ]}"#;

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl EditionFetcher for CountingFetcher {
        fn fetch<'a>(&'a self, edition_id: &'a str) -> BoxFuture<'a, Result<String>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if edition_id == "LATVUL" {
                    Ok(DOC.to_string())
                } else {
                    Err(VerbumError::NotFound(edition_id.to_string()))
                }
            })
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(VerbumError::Storage("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(VerbumError::Storage("disk on fire".to_string()))
        }
    }

    fn counting() -> Arc<CountingFetcher> {
        Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_memoizes_per_edition() {
        let fetcher = counting();
        let source = TextSource::new(fetcher.clone(), Arc::new(MemoryStore::new()));

        source.edition("LATVUL").await.unwrap();
        source.edition("LATVUL").await.unwrap();
        source.book_summaries("LATVUL").await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(source.is_loaded("LATVUL").await);
    }

    #[tokio::test]
    async fn test_fetch_writes_back_to_store() {
        let store = Arc::new(MemoryStore::new());
        let source = TextSource::new(counting(), store.clone());

        source.edition("LATVUL").await.unwrap();
        assert!(store.get("bibleData-LATVUL").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_consulted_before_fetcher() {
        let store = Arc::new(MemoryStore::new());
        store.set("bibleData-LATVUL", DOC).unwrap();
        let fetcher = counting();
        let source = TextSource::new(fetcher.clone(), store);

        let data = source.edition("LATVUL").await.unwrap();
        assert_eq!(data.books[0].name, "Genesis");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_storage_errors_degrade_to_miss() {
        let fetcher = counting();
        let source = TextSource::new(fetcher.clone(), Arc::new(BrokenStore));

        let chapter = source.chapter("LATVUL", "Genesis", 1).await.unwrap();
        assert_eq!(chapter.verses.len(), 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_failures() {
        let source = TextSource::new(counting(), Arc::new(MemoryStore::new()));

        assert!(matches!(source.edition("XYZ").await, Err(VerbumError::NotFound(_))));
        assert!(matches!(
            source.chapter("LATVUL", "Exodus", 1).await,
            Err(VerbumError::BookNotFound(_))
        ));
        assert!(matches!(
            source.chapter("LATVUL", "Genesis", 2).await,
            Err(VerbumError::ChapterNotFound { chapter: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_verse_by_ordinal() {
        let source = TextSource::new(counting(), Arc::new(MemoryStore::new()));
        let verse = source.verse_by_ordinal("LATVUL", 1, 1, 1).await.unwrap();
        assert!(verse.text.starts_with("In principio"));
        assert!(source.verse_by_ordinal("LATVUL", 2, 1, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_dir_fetcher_reads_json() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("KJV.json"), DOC).unwrap();
        let fetcher = DirFetcher::new(dir.path());

        assert!(fetcher.fetch("KJV").await.unwrap().contains("Genesis"));
        assert!(matches!(fetcher.fetch("WLC").await, Err(VerbumError::NotFound(_))));
    }

    #[test]
    fn test_http_fetcher_url() {
        let fetcher = HttpFetcher::new("http://localhost:8000/");
        assert_eq!(fetcher.url_for("KJV"), "http://localhost:8000/bibles/KJV.json");
    }

    #[tokio::test]
    async fn test_http_fetcher_returns_body() {
        let base = serve_canned("200 OK", DOC).await;
        let fetcher = HttpFetcher::new(&base);

        assert_eq!(fetcher.fetch("LATVUL").await.unwrap(), DOC);
    }

    #[tokio::test]
    async fn test_http_fetcher_error_status_is_not_found() {
        for status in ["404 Not Found", "500 Internal Server Error"] {
            let base = serve_canned(status, "nope").await;
            let fetcher = HttpFetcher::new(&base);

            let result = fetcher.fetch("KJV").await;
            assert!(matches!(result, Err(VerbumError::NotFound(_))), "{}: {:?}", status, result);
        }
    }
}
