//! AI commentary about the current selection
//!
//! Prompts are deterministic, so the prompt text doubles as the cache key.
//! A response only lands if the selection generation it was issued under is
//! still current when it completes.

use crate::edition::{Edition, GREEK_EDITION, HEBREW_EDITION};
use crate::error::Result;
use crate::navigation::NavigationState;
use crate::selection::Selection;
use crate::store::{KeyValueStore, PROMPT_KEY_PREFIX};
use futures_util::future::BoxFuture;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

const RESPONSE_LIMIT: &str = "Response may not exceed 50 words (Unless you are quoting verses).";

/// Sends a finished prompt to a language model and returns its text
pub trait CommentaryBackend: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPurpose {
    Word,
    Verse,
}

impl TabPurpose {
    pub fn of(selection: &Selection) -> Option<Self> {
        match selection {
            Selection::None => None,
            Selection::Word { .. } => Some(TabPurpose::Word),
            Selection::Verse(_) => Some(TabPurpose::Verse),
        }
    }
}

/// Original-language text appended to a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceText {
    Hebrew,
    Greek,
}

impl ReferenceText {
    pub fn edition_id(&self) -> &'static str {
        match self {
            ReferenceText::Hebrew => HEBREW_EDITION,
            ReferenceText::Greek => GREEK_EDITION,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceText::Hebrew => "Hebrew",
            ReferenceText::Greek => "Greek",
        }
    }
}

#[derive(Debug)]
pub struct CommentaryTab {
    pub title: &'static str,
    pub icon: &'static str,
    pub prompt: &'static str,
    pub purpose: TabPurpose,
    pub reference: Option<ReferenceText>,
}

pub const NOTES_TAB: usize = 6;

pub static TABS: [CommentaryTab; 11] = [
    CommentaryTab {
        title: "Define",
        icon: "📖",
        prompt: "Define the selected word",
        purpose: TabPurpose::Word,
        reference: None,
    },
    CommentaryTab {
        title: "Hebrew",
        icon: "🇮🇱",
        prompt: "Explain is the Hebrew word behind the selected word in the selected verse.",
        purpose: TabPurpose::Word,
        reference: Some(ReferenceText::Hebrew),
    },
    CommentaryTab {
        title: "Greek",
        icon: "🇬🇷",
        prompt: "Explain is the Greek word behind the selected word in the selected verse. It either comes from the LXX or the NT Greek",
        purpose: TabPurpose::Word,
        reference: Some(ReferenceText::Greek),
    },
    CommentaryTab {
        title: "Roots & Etymology",
        icon: "🌱",
        prompt: "List roots and etymology for the selected word",
        purpose: TabPurpose::Word,
        reference: None,
    },
    CommentaryTab {
        title: "Metaphysical",
        icon: "🔮",
        prompt: "List metaphysical significance of the selected word",
        purpose: TabPurpose::Word,
        reference: None,
    },
    CommentaryTab {
        title: "Other Verses",
        icon: "🔍",
        prompt: "Quote other verses with the selected word",
        purpose: TabPurpose::Word,
        reference: None,
    },
    CommentaryTab {
        title: "Notes",
        icon: "📝",
        prompt: "Notes for the selected verse",
        purpose: TabPurpose::Verse,
        reference: None,
    },
    CommentaryTab {
        title: "Cross-Reference",
        icon: "🔗",
        prompt: "List cross reference verses for the selected verse",
        purpose: TabPurpose::Verse,
        reference: None,
    },
    CommentaryTab {
        title: "Metaphysics",
        icon: "🔮",
        prompt: "Metaphysics for the selected verse",
        purpose: TabPurpose::Verse,
        reference: None,
    },
    CommentaryTab {
        title: "All Interpretations",
        icon: "🔍",
        prompt: "List all interpretations for the selected verse",
        purpose: TabPurpose::Verse,
        reference: None,
    },
    CommentaryTab {
        title: "Ancient Interpretations",
        icon: "🔍",
        prompt: "List ancient interpretations for the selected verse, you may include Jewish, Kabbalistic, Gnostic, Martin Lutherian, Alchemical, Paracelsus, and Early Christian interpretations",
        purpose: TabPurpose::Verse,
        reference: None,
    },
];

/// Indices into `TABS` offered for this kind of selection
pub fn tabs_for(selection: &Selection) -> Vec<usize> {
    match TabPurpose::of(selection) {
        Some(purpose) => TABS
            .iter()
            .enumerate()
            .filter(|(_, tab)| tab.purpose == purpose)
            .map(|(i, _)| i)
            .collect(),
        None => Vec::new(),
    }
}

/// What the prompt is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject<'a> {
    Word(&'a str),
    Verse { reference: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossText {
    pub label: &'static str,
    pub title: String,
    pub text: String,
}

pub fn build_prompt(
    tab: &CommentaryTab,
    edition: Option<&Edition>,
    subject: &Subject<'_>,
    verse_text: &str,
    cross: Option<&CrossText>,
) -> String {
    let (title, id) = edition
        .map(|e| (e.title.as_str(), e.id.as_str()))
        .unwrap_or(("", ""));

    let mut prompt = format!("{}\n{}\nVersion: {} ({})\n", tab.prompt, RESPONSE_LIMIT, title, id);
    match subject {
        Subject::Word(word) => prompt.push_str(&format!("Word: {}\n\nContext: ", word)),
        Subject::Verse { reference } => prompt.push_str(&format!("\n\nVerse: {} ", reference)),
    }
    prompt.push_str(verse_text);

    if let Some(cross) = cross {
        prompt.push_str(&format!("\n\n{} text ({}): {}", cross.label, cross.title, cross.text));
    }
    prompt
}

/// A commentary call the caller must run and hand back to `complete`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryRequest {
    pub id: u64,
    pub tab: usize,
    pub prompt: String,
    pub generation: u64,
}

pub struct CommentaryState {
    selected_tab: usize,
    response: String,
    error: Option<String>,
    cache: LruCache<String, String>,
    store: Arc<dyn KeyValueStore>,
    in_flight: Option<u64>,
    next_id: u64,
}

impl CommentaryState {
    pub fn new(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            selected_tab: 0,
            response: String::new(),
            error: None,
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            store,
            in_flight: None,
            next_id: 0,
        }
    }

    pub fn selected_tab(&self) -> usize {
        self.selected_tab
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn reset(&mut self) {
        self.response.clear();
        self.error = None;
        self.in_flight = None;
    }

    /// Open the first tab matching the new selection, or reset when it is empty
    pub async fn on_selection_changed(&mut self, nav: &NavigationState) -> Option<CommentaryRequest> {
        match tabs_for(nav.selection().current()).first() {
            Some(&tab) => self.open_tab(tab, nav).await,
            None => {
                self.reset();
                None
            }
        }
    }

    /// Serve the tab from cache or the verse note, or hand back a request to run
    pub async fn open_tab(&mut self, tab_id: usize, nav: &NavigationState) -> Option<CommentaryRequest> {
        let tab = TABS.get(tab_id)?;
        self.selected_tab = tab_id;
        self.response.clear();
        self.error = None;
        self.in_flight = None;

        let selection = nav.selection().current();
        let verse_number = selection.verse()?;
        let Some(verse) = nav.verse(verse_number) else {
            debug!(verse = verse_number, "selected verse not in loaded chapter");
            return None;
        };

        let chapter = nav.content().chapter;
        let subject = match selection.word() {
            Some(word) => Subject::Word(word),
            None => Subject::Verse {
                reference: verse.reference(nav.cursor().book.as_deref().unwrap_or_default(), chapter),
            },
        };

        let cross = match tab.reference {
            Some(reference) => cross_text(reference, nav, chapter, verse_number).await,
            None => None,
        };

        let prompt = build_prompt(tab, nav.edition(), &subject, &verse.text, cross.as_ref());

        if let Some(cached) = self.cached(&prompt) {
            self.response = cached;
            return None;
        }

        if tab_id == NOTES_TAB {
            if let Some(note) = &verse.notes {
                self.response = note.clone();
                return None;
            }
        }

        self.next_id += 1;
        self.in_flight = Some(self.next_id);
        Some(CommentaryRequest {
            id: self.next_id,
            tab: tab_id,
            prompt,
            generation: nav.selection().generation(),
        })
    }

    /// Land a finished request. Stale generations are dropped without caching.
    pub fn complete(&mut self, request: &CommentaryRequest, result: Result<String>, current_generation: u64) {
        let is_current = self.in_flight == Some(request.id);
        if is_current {
            self.in_flight = None;
        }

        if request.generation != current_generation {
            debug!(request = request.id, "discarding commentary for a previous selection");
            return;
        }

        match result {
            Ok(text) => {
                self.remember(&request.prompt, &text);
                if is_current {
                    self.response = text;
                }
            }
            Err(e) => {
                warn!(request = request.id, error = %e, "commentary request failed");
                if is_current {
                    self.error = Some(e.to_string());
                }
            }
        }
    }

    fn cached(&mut self, prompt: &str) -> Option<String> {
        if let Some(text) = self.cache.get(prompt) {
            return Some(text.clone());
        }

        let key = format!("{}{}", PROMPT_KEY_PREFIX, prompt);
        match self.store.get(&key) {
            Ok(Some(text)) => {
                self.cache.put(prompt.to_string(), text.clone());
                Some(text)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "commentary cache read failed, treating as miss");
                None
            }
        }
    }

    fn remember(&mut self, prompt: &str, text: &str) {
        self.cache.put(prompt.to_string(), text.to_string());
        let key = format!("{}{}", PROMPT_KEY_PREFIX, prompt);
        if let Err(e) = self.store.set(&key, text) {
            warn!(error = %e, "failed to persist commentary");
        }
    }
}

async fn cross_text(
    reference: ReferenceText,
    nav: &NavigationState,
    chapter: u32,
    verse: u32,
) -> Option<CrossText> {
    let edition_id = reference.edition_id();
    if nav.cursor().edition.as_deref() == Some(edition_id) {
        return None;
    }
    let ordinal = nav.book_ordinal()?;

    match nav.source().verse_by_ordinal(edition_id, ordinal, chapter, verse).await {
        Ok(found) => Some(CrossText {
            label: reference.label(),
            title: nav
                .catalog()
                .find(edition_id)
                .map(|e| e.title.clone())
                .unwrap_or_else(|| edition_id.to_string()),
            text: found.text,
        }),
        Err(e) => {
            debug!(edition = edition_id, error = %e, "no reference text for verse");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_prompt_layout() {
        let edition = Edition::new("LATVUL", "Latin Vulgate");
        let prompt = build_prompt(
            &TABS[0],
            Some(&edition),
            &Subject::Word("Verbum"),
            "In principio erat Verbum",
            None,
        );
        assert_eq!(
            prompt,
            "Define the selected word\n\
             Response may not exceed 50 words (Unless you are quoting verses).\n\
             Version: Latin Vulgate (LATVUL)\n\
             Word: Verbum\n\nContext: In principio erat Verbum"
        );
    }

    #[test]
    fn test_verse_prompt_with_cross_text() {
        let edition = Edition::new("ENGVUL", "English Vulgate");
        let cross = CrossText {
            label: "Hebrew",
            title: "Masoretic Hebrew".to_string(),
            text: "בְּרֵאשִׁית".to_string(),
        };
        let prompt = build_prompt(
            &TABS[NOTES_TAB],
            Some(&edition),
            &Subject::Verse {
                reference: "Genesis 1:1".to_string(),
            },
            "In the beginning",
            Some(&cross),
        );
        assert!(prompt.contains("Version: English Vulgate (ENGVUL)\n\n\nVerse: Genesis 1:1 In the beginning"));
        assert!(prompt.ends_with("\n\nHebrew text (Masoretic Hebrew): בְּרֵאשִׁית"));
    }

    #[test]
    fn test_tabs_for_selection_kind() {
        assert!(tabs_for(&Selection::None).is_empty());
        assert_eq!(
            tabs_for(&Selection::Word {
                word: "lux".to_string(),
                verse: 3
            }),
            vec![0, 1, 2, 3, 4, 5]
        );
        assert_eq!(tabs_for(&Selection::Verse(3)), vec![6, 7, 8, 9, 10]);
        assert_eq!(TABS[NOTES_TAB].title, "Notes");
    }

    #[test]
    fn test_reference_flags() {
        assert_eq!(TABS[1].reference, Some(ReferenceText::Hebrew));
        assert_eq!(TABS[2].reference.map(|r| r.edition_id()), Some("LXXTR"));
    }
}
