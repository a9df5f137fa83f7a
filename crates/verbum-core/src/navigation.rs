//! Chapter traversal across editions
//!
//! The cursor is the (edition, book, chapter) triple on screen. Every
//! operation here is a silent no-op when the cursor is incomplete, and lookup
//! failures are absorbed by falling back to the first book of the edition.

use crate::edition::{Edition, EditionCatalog};
use crate::error::Result;
use crate::model::{BookSummary, Chapter, Verse};
use crate::selection::SelectionState;
use crate::source::TextSource;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub edition: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<u32>,
}

impl Cursor {
    pub fn new(edition: &str, book: &str, chapter: u32) -> Self {
        Self {
            edition: Some(edition.to_string()),
            book: Some(book.to_string()),
            chapter: Some(chapter),
        }
    }

    fn parts(&self) -> Option<(String, String, u32)> {
        match (&self.edition, &self.book, self.chapter) {
            (Some(edition), Some(book), Some(chapter)) => Some((edition.clone(), book.clone(), chapter)),
            _ => None,
        }
    }
}

pub struct NavigationState {
    source: Arc<TextSource>,
    catalog: EditionCatalog,
    cursor: Cursor,
    books: Vec<BookSummary>,
    chapters: Vec<u32>,
    content: Chapter,
    selection: SelectionState,
    tx: watch::Sender<Cursor>,
}

impl NavigationState {
    pub fn new(source: Arc<TextSource>, catalog: EditionCatalog, cursor: Cursor) -> Self {
        let (tx, _) = watch::channel(cursor.clone());
        Self {
            source,
            catalog,
            cursor,
            books: Vec::new(),
            chapters: Vec::new(),
            content: Chapter::default(),
            selection: SelectionState::new(),
            tx,
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn books(&self) -> &[BookSummary] {
        &self.books
    }

    /// Valid chapter numbers of the current book, `1..=count`
    pub fn chapters(&self) -> &[u32] {
        &self.chapters
    }

    pub fn content(&self) -> &Chapter {
        &self.content
    }

    pub fn verse(&self, number: u32) -> Option<&Verse> {
        self.content.verse(number)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn source(&self) -> &Arc<TextSource> {
        &self.source
    }

    pub fn catalog(&self) -> &EditionCatalog {
        &self.catalog
    }

    pub fn edition(&self) -> Option<&Edition> {
        self.cursor.edition.as_deref().and_then(|id| self.catalog.find(id))
    }

    /// Ordinal of the current book, for cross-edition lookups
    pub fn book_ordinal(&self) -> Option<u32> {
        let book = self.cursor.book.as_ref()?;
        self.books.iter().find(|b| &b.name == book).map(|b| b.ordinal)
    }

    pub fn title(&self) -> String {
        match (&self.cursor.book, self.cursor.chapter) {
            (Some(book), Some(chapter)) => format!("{} {}", book, chapter),
            _ => "Select a chapter".to_string(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Cursor> {
        self.tx.subscribe()
    }

    fn publish(&self) {
        self.tx.send_replace(self.cursor.clone());
    }

    /// Load the chapter under the cursor, falling back once to the first book
    pub async fn load_chapter(&mut self) {
        let mut fell_back = false;
        loop {
            let Some((edition, book, chapter)) = self.cursor.parts() else {
                return;
            };
            self.selection.clear();

            let err = match self.fetch(&edition, &book, chapter).await {
                Ok(()) => {
                    debug!(%edition, %book, chapter, "chapter loaded");
                    return;
                }
                Err(e) => e,
            };

            if err.is_missing() {
                info!(%edition, %book, chapter, error = %err, "chapter not in edition");
            } else {
                warn!(%edition, %book, chapter, error = %err, "chapter load failed");
            }
            self.content = Chapter::default();

            let first = match self.books.first() {
                Some(first) => first.name.clone(),
                None => return,
            };
            if fell_back || first == book {
                return;
            }

            info!(%edition, from = %book, to = %first, "falling back to first book");
            self.cursor.book = Some(first);
            self.cursor.chapter = Some(1);
            self.publish();
            fell_back = true;
        }
    }

    async fn fetch(&mut self, edition: &str, book: &str, chapter: u32) -> Result<()> {
        self.books = match self.source.book_summaries(edition).await {
            Ok(books) => books,
            Err(e) => {
                self.books.clear();
                self.chapters.clear();
                return Err(e);
            }
        };
        self.content = match self.source.chapter(edition, book, chapter).await {
            Ok(content) => content,
            Err(e) => {
                self.chapters.clear();
                return Err(e);
            }
        };

        let count = self
            .books
            .iter()
            .find(|b| b.name == book)
            .map(|b| b.chapter_count)
            .unwrap_or(0);
        self.chapters = (1..=count).collect();
        Ok(())
    }

    pub async fn next_chapter(&mut self) {
        let (Some(edition), Some(chapter)) = (self.cursor.edition.clone(), self.cursor.chapter) else {
            return;
        };
        let Ok(books) = self.source.book_summaries(&edition).await else {
            return;
        };
        let Some(index) = books.iter().position(|b| Some(&b.name) == self.cursor.book.as_ref()) else {
            return;
        };

        if chapter >= books[index].chapter_count {
            let Some(next) = books.get(index + 1) else {
                return;
            };
            self.cursor.book = Some(next.name.clone());
            self.cursor.chapter = Some(1);
        } else {
            self.cursor.chapter = Some(chapter + 1);
        }

        self.publish();
        self.load_chapter().await;
    }

    pub async fn previous_chapter(&mut self) {
        let (Some(edition), Some(chapter)) = (self.cursor.edition.clone(), self.cursor.chapter) else {
            return;
        };
        let Ok(books) = self.source.book_summaries(&edition).await else {
            return;
        };
        let Some(index) = books.iter().position(|b| Some(&b.name) == self.cursor.book.as_ref()) else {
            return;
        };

        if chapter <= 1 {
            if index == 0 {
                return;
            }
            let previous = &books[index - 1];
            self.cursor.book = Some(previous.name.clone());
            self.cursor.chapter = Some(previous.chapter_count.max(1));
        } else {
            self.cursor.chapter = Some(chapter - 1);
        }

        self.publish();
        self.load_chapter().await;
    }

    /// Step to the next edition of the catalog rotation
    pub async fn switch_edition(&mut self) {
        let Some(next) = self.catalog.next_after(self.cursor.edition.as_deref()) else {
            return;
        };
        self.cursor.edition = Some(next.id.clone());
        self.publish();
        self.load_chapter().await;
    }

    pub async fn set_edition(&mut self, edition_id: &str) {
        self.cursor.edition = Some(edition_id.to_string());
        self.publish();
        self.load_chapter().await;
    }

    pub async fn set_book(&mut self, book: &str) {
        self.cursor.book = Some(book.to_string());
        self.cursor.chapter = Some(1);
        self.publish();
        self.load_chapter().await;
    }

    pub async fn set_chapter(&mut self, chapter: u32) {
        self.cursor.chapter = Some(chapter);
        self.publish();
        self.load_chapter().await;
    }
}
