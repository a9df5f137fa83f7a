use crate::words::words_match;
use tokio::sync::watch;
use tracing::debug;

/// What the reader has picked in the current chapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Word { word: String, verse: u32 },
    Verse(u32),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn word(&self) -> Option<&str> {
        match self {
            Selection::Word { word, .. } => Some(word),
            _ => None,
        }
    }

    /// Verse-only selection
    pub fn selected_verse(&self) -> Option<u32> {
        match self {
            Selection::Verse(verse) => Some(*verse),
            _ => None,
        }
    }

    /// The verse the selection refers to, whichever kind it is
    pub fn verse(&self) -> Option<u32> {
        match self {
            Selection::None => None,
            Selection::Word { verse, .. } => Some(*verse),
            Selection::Verse(verse) => Some(*verse),
        }
    }
}

pub struct SelectionState {
    selection: Selection,
    continuous: bool,
    generation: u64,
    tx: watch::Sender<Selection>,
}

impl SelectionState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Selection::None);
        Self {
            selection: Selection::None,
            continuous: false,
            generation: 0,
            tx,
        }
    }

    pub fn current(&self) -> &Selection {
        &self.selection
    }

    /// Bumped on every selection change; commentary responses are checked against it
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }

    /// Word click: promote a repeated word to its verse, deselect when a verse is active
    pub fn select_word(&mut self, word: &str, verse: u32) {
        let next = match &self.selection {
            Selection::Word { word: current, .. } if current == word => Selection::Verse(verse),
            Selection::Verse(_) => Selection::None,
            _ => Selection::Word {
                word: word.to_string(),
                verse,
            },
        };
        self.set(next);
    }

    pub fn select_verse(&mut self, verse: u32) {
        let next = if self.selection.selected_verse() == Some(verse) {
            Selection::None
        } else {
            Selection::Verse(verse)
        };
        self.set(next);
    }

    pub fn clear(&mut self) {
        self.set(Selection::None);
    }

    /// Whether a word on screen shares a stem with the selected word
    pub fn highlights(&self, word: &str) -> bool {
        self.selection
            .word()
            .map(|selected| words_match(selected, word))
            .unwrap_or(false)
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    pub fn toggle_continuous(&mut self) {
        self.continuous = !self.continuous;
    }

    fn set(&mut self, next: Selection) {
        if next == self.selection {
            return;
        }
        debug!(from = ?self.selection, to = ?next, "selection changed");
        self.selection = next;
        self.generation += 1;
        self.tx.send_replace(self.selection.clone());
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}
