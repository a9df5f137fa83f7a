//! Shared fixtures for the integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use verbum_core::{
    CommentaryBackend, Cursor, EditionCatalog, EditionFetcher, KeyValueStore, MemoryStore,
    NavigationState, Result, TextSource, VerbumError,
};

/// Serves edition documents from memory and counts fetches
pub struct MapFetcher {
    docs: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MapFetcher {
    pub fn new(docs: HashMap<String, String>) -> Self {
        Self {
            docs,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EditionFetcher for MapFetcher {
    fn fetch<'a>(&'a self, edition_id: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.docs
                .get(edition_id)
                .cloned()
                .ok_or_else(|| VerbumError::NotFound(edition_id.to_string()))
        })
    }
}

/// Answers every prompt with a canned text and counts calls
pub struct CannedBackend {
    pub reply: String,
    calls: AtomicUsize,
}

impl CannedBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommentaryBackend for CannedBackend {
    fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        })
    }
}

/// Every read and write fails
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(VerbumError::Storage("database is locked".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(VerbumError::Storage("database is locked".to_string()))
    }
}

fn book(name: &str, chapters: &[&[&str]]) -> Value {
    let chapters: Vec<Value> = chapters
        .iter()
        .enumerate()
        .map(|(c, verses)| {
            let verses: Vec<Value> = verses
                .iter()
                .enumerate()
                .map(|(v, text)| json!({"verse": v + 1, "text": text, "notes": ""}))
                .collect();
            json!({"chapter": c + 1, "verses": verses})
        })
        .collect();
    json!({"name": name, "testament": "OT", "chapters": chapters})
}

pub fn latin_vulgate() -> String {
    let mut genesis = book(
        "Genesis",
        &[
            &[
                "In principio creavit Deus caelum et terram.",
                "Terra autem erat inanis et vacua, et tenebrae erant super faciem abyssi.",
                "Dixitque Deus: Fiat lux. Et facta est lux.",
            ],
            &["Igitur perfecti sunt caeli et terra, et omnis ornatus eorum."],
        ],
    );
    genesis["chapters"][0]["verses"][0]["notes"] = json!("The opening of creation.");

    json!({
        "title": "Latin Vulgate",
        "books": [
            genesis,
            book(
                "Exodus",
                &[
                    &["Haec sunt nomina filiorum Israel."],
                    &["Egressus est post haec vir de domo Levi."],
                    &["Moyses autem pascebat oves Jethro cognati sui."],
                ],
            ),
        ]
    })
    .to_string()
}

pub fn english_vulgate() -> String {
    json!({
        "books": [
            book(
                "Genesis",
                &[
                    &["In the beginning God created heaven, and earth."],
                    &["So the heavens and the earth were finished."],
                ],
            ),
            book("Exodus", &[&["These are the names of the children of Israel."]]),
        ]
    })
    .to_string()
}

/// Hebrew book names, so lookups by Latin name miss
pub fn masoretic() -> String {
    json!({
        "books": [
            book("Bereshit", &[&["בְּרֵאשִׁית בָּרָא אֱלֹהִים אֵת הַשָּׁמַיִם וְאֵת הָאָרֶץ"]]),
            book("Shemot", &[&["וְאֵלֶּה שְׁמוֹת בְּנֵי יִשְׂרָאֵל"]]),
        ]
    })
    .to_string()
}

/// LATVUL, ENGVUL and WLC; KJV and LXXTR are missing
pub fn fetcher() -> Arc<MapFetcher> {
    let docs = [
        ("LATVUL", latin_vulgate()),
        ("ENGVUL", english_vulgate()),
        ("WLC", masoretic()),
    ]
    .into_iter()
    .map(|(id, doc)| (id.to_string(), doc))
    .collect();
    Arc::new(MapFetcher::new(docs))
}

pub fn source_with(fetcher: Arc<MapFetcher>, store: Arc<dyn KeyValueStore>) -> Arc<TextSource> {
    Arc::new(TextSource::new(fetcher, store))
}

pub fn navigation(cursor: Cursor) -> NavigationState {
    let source = source_with(fetcher(), Arc::new(MemoryStore::new()));
    NavigationState::new(source, EditionCatalog::default(), cursor)
}

pub async fn loaded(edition: &str, book: &str, chapter: u32) -> NavigationState {
    let mut nav = navigation(Cursor::new(edition, book, chapter));
    nav.load_chapter().await;
    nav
}
