use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use verbum_core::commentary::tabs_for;
use verbum_core::words::verse_words;
use verbum_core::{
    CommentaryBackend, CommentaryRequest, CommentaryState, NavigationState, Selection, VerbumError, Verse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    Book,
    Chapter,
}

type CommentaryTask = JoinHandle<verbum_core::Result<String>>;

pub struct App {
    pub should_quit: bool,

    pub nav: NavigationState,
    pub commentary: CommentaryState,
    backend: Arc<dyn CommentaryBackend>,
    selection_rx: watch::Receiver<Selection>,
    pending: Vec<(CommentaryRequest, CommentaryTask)>,

    // Reading cursor, independent of the selection
    pub verse_idx: usize,
    pub word_idx: usize,

    pub picker: Option<Picker>,
    pub picker_state: ListState,

    pub content_scroll: u16,
    pub content_height: u16,
    // (first row, wrapped height) of each verse as last rendered
    verse_rows: Vec<(u16, u16)>,
    pub info_scroll: u16,

    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(nav: NavigationState, commentary: CommentaryState, backend: Arc<dyn CommentaryBackend>) -> Self {
        let selection_rx = nav.selection().subscribe();
        Self {
            should_quit: false,
            nav,
            commentary,
            backend,
            selection_rx,
            pending: Vec::new(),
            verse_idx: 0,
            word_idx: 0,
            picker: None,
            picker_state: ListState::default(),
            content_scroll: 0,
            content_height: 0,
            verse_rows: Vec::new(),
            info_scroll: 0,
            animation_frame: 0,
        }
    }

    pub fn verses(&self) -> &[Verse] {
        &self.nav.content().verses
    }

    pub fn focused_verse(&self) -> Option<&Verse> {
        self.verses().get(self.verse_idx)
    }

    /// Display words of a verse under the current script mode
    pub fn words_of(&self, verse: &Verse) -> Vec<String> {
        verse_words(&verse.text, self.nav.selection().is_continuous())
    }

    pub fn focused_word(&self) -> Option<String> {
        let verse = self.focused_verse()?;
        self.words_of(verse).into_iter().nth(self.word_idx)
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    // === Reading cursor ===

    pub fn next_verse(&mut self) {
        if self.verse_idx + 1 < self.verses().len() {
            self.verse_idx += 1;
            self.word_idx = 0;
            self.scroll_to_focused_verse();
        }
    }

    pub fn prev_verse(&mut self) {
        if self.verse_idx > 0 {
            self.verse_idx -= 1;
            self.word_idx = 0;
            self.scroll_to_focused_verse();
        }
    }

    pub fn next_word(&mut self) {
        let count = self.focused_verse().map(|v| self.words_of(v).len()).unwrap_or(0);
        if self.word_idx + 1 < count {
            self.word_idx += 1;
        } else if self.verse_idx + 1 < self.verses().len() {
            self.next_verse();
        }
    }

    pub fn prev_word(&mut self) {
        if self.word_idx > 0 {
            self.word_idx -= 1;
        } else if self.verse_idx > 0 {
            self.prev_verse();
            self.word_idx = self
                .focused_verse()
                .map(|v| self.words_of(v).len().saturating_sub(1))
                .unwrap_or(0);
        }
    }

    /// Record the wrapped layout of the chapter pane
    pub fn set_verse_rows(&mut self, rows: Vec<(u16, u16)>) {
        self.verse_rows = rows;
    }

    /// Total wrapped rows of the chapter pane
    pub fn content_lines(&self) -> u16 {
        self.verse_rows
            .last()
            .map(|&(top, height)| top + height)
            .unwrap_or(0)
    }

    /// Keep the focused verse on screen, clamped to the rendered content
    pub fn scroll_to_focused_verse(&mut self) {
        let Some(&(top, height)) = self.verse_rows.get(self.verse_idx) else {
            return;
        };
        let bottom = top + height;
        if top < self.content_scroll {
            self.content_scroll = top;
        } else if self.content_height > 0 && bottom > self.content_scroll + self.content_height {
            // A verse taller than the pane shows from its first row
            self.content_scroll = bottom.saturating_sub(self.content_height).min(top);
        }

        let max_scroll = self.content_lines().saturating_sub(self.content_height);
        self.content_scroll = self.content_scroll.min(max_scroll);
    }

    fn reset_reading_cursor(&mut self) {
        self.verse_idx = 0;
        self.word_idx = 0;
        self.content_scroll = 0;
        self.verse_rows.clear();
    }

    // === Selection ===

    pub fn select_focused_word(&mut self) {
        let Some(word) = self.focused_word() else {
            return;
        };
        let Some(verse) = self.focused_verse().map(|v| v.verse) else {
            return;
        };
        self.nav.selection_mut().select_word(&word, verse);
    }

    pub fn select_focused_verse(&mut self) {
        if let Some(verse) = self.focused_verse().map(|v| v.verse) {
            self.nav.selection_mut().select_verse(verse);
        }
    }

    pub fn clear_selection(&mut self) {
        self.nav.selection_mut().clear();
    }

    pub fn toggle_continuous(&mut self) {
        self.nav.selection_mut().toggle_continuous();
        let count = self.focused_verse().map(|v| self.words_of(v).len()).unwrap_or(0);
        self.word_idx = self.word_idx.min(count.saturating_sub(1));
    }

    // === Navigation ===

    pub async fn next_chapter(&mut self) {
        self.nav.next_chapter().await;
        self.reset_reading_cursor();
    }

    pub async fn previous_chapter(&mut self) {
        self.nav.previous_chapter().await;
        self.reset_reading_cursor();
    }

    pub async fn switch_edition(&mut self) {
        self.nav.switch_edition().await;
        self.word_idx = 0;
        self.verse_idx = self.verse_idx.min(self.verses().len().saturating_sub(1));
    }

    pub fn open_picker(&mut self, picker: Picker) {
        let current = match picker {
            Picker::Book => {
                let book = self.nav.cursor().book.as_deref();
                self.nav.books().iter().position(|b| Some(b.name.as_str()) == book)
            }
            Picker::Chapter => {
                let chapter = self.nav.cursor().chapter;
                self.nav.chapters().iter().position(|&c| Some(c) == chapter)
            }
        };
        self.picker = Some(picker);
        self.picker_state.select(Some(current.unwrap_or(0)));
    }

    pub fn picker_len(&self) -> usize {
        match self.picker {
            Some(Picker::Book) => self.nav.books().len(),
            Some(Picker::Chapter) => self.nav.chapters().len(),
            None => 0,
        }
    }

    pub fn picker_down(&mut self) {
        let len = self.picker_len();
        if len == 0 {
            return;
        }
        let i = self.picker_state.selected().map(|i| (i + 1).min(len - 1)).unwrap_or(0);
        self.picker_state.select(Some(i));
    }

    pub fn picker_up(&mut self) {
        let i = self.picker_state.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.picker_state.select(Some(i));
    }

    pub async fn confirm_picker(&mut self) {
        let (Some(picker), Some(i)) = (self.picker.take(), self.picker_state.selected()) else {
            return;
        };
        match picker {
            Picker::Book => {
                if let Some(name) = self.nav.books().get(i).map(|b| b.name.clone()) {
                    self.nav.set_book(&name).await;
                }
            }
            Picker::Chapter => {
                if let Some(&chapter) = self.nav.chapters().get(i) {
                    self.nav.set_chapter(chapter).await;
                }
            }
        }
        self.reset_reading_cursor();
    }

    // === Commentary ===

    /// Tabs offered for the current selection, as indices into `TABS`
    pub fn available_tabs(&self) -> Vec<usize> {
        tabs_for(self.nav.selection().current())
    }

    /// Open the n-th tab offered for the current selection
    pub async fn open_tab(&mut self, n: usize) {
        let Some(&tab) = self.available_tabs().get(n) else {
            return;
        };
        self.info_scroll = 0;
        let request = self.commentary.open_tab(tab, &self.nav).await;
        self.spawn(request);
    }

    pub async fn cycle_tab(&mut self) {
        let tabs = self.available_tabs();
        if tabs.is_empty() {
            return;
        }
        let position = tabs.iter().position(|&t| t == self.commentary.selected_tab());
        let next = position.map(|p| (p + 1) % tabs.len()).unwrap_or(0);
        self.open_tab(next).await;
    }

    /// React to a selection change published since the last call
    pub async fn sync_commentary(&mut self) {
        if !self.selection_rx.has_changed().unwrap_or(false) {
            return;
        }
        let _ = self.selection_rx.borrow_and_update();
        self.info_scroll = 0;
        let request = self.commentary.on_selection_changed(&self.nav).await;
        self.spawn(request);
    }

    fn spawn(&mut self, request: Option<CommentaryRequest>) {
        let Some(request) = request else {
            return;
        };
        debug!(request = request.id, tab = request.tab, "requesting commentary");
        let backend = Arc::clone(&self.backend);
        let prompt = request.prompt.clone();
        let task = tokio::spawn(async move { backend.complete(&prompt).await });
        self.pending.push((request, task));
    }

    /// Hand finished commentary calls back to the commentary state
    pub async fn poll_commentary(&mut self) {
        let generation = self.nav.selection().generation();
        for (request, task) in std::mem::take(&mut self.pending) {
            if !task.is_finished() {
                self.pending.push((request, task));
                continue;
            }
            let result = task
                .await
                .unwrap_or_else(|e| Err(VerbumError::ExternalService(format!("commentary task failed: {}", e))));
            self.commentary.complete(&request, result, generation);
        }
    }

    pub fn tick_animation(&mut self) {
        if self.commentary.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_info_down(&mut self) {
        self.info_scroll = self.info_scroll.saturating_add(1);
    }

    pub fn scroll_info_up(&mut self) {
        self.info_scroll = self.info_scroll.saturating_sub(1);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for (_, task) in &self.pending {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use verbum_core::{Cursor, EditionCatalog, EditionFetcher, MemoryStore, TextSource};

    const DOC: &str = r#"{"books": [
        {"name": "Genesis", "chapters": [
            {"chapter": 1, "verses": [
                {"verse": 1, "text": "In principio creavit Deus caelum et terram.", "notes": "Creation."},
                {"verse": 2, "text": "Terra autem erat inanis et vacua."}
            ]},
            {"chapter": 2, "verses": [{"verse": 1, "text": "Igitur perfecti sunt caeli et terra."}]}
        ]}
    ]}"#;

    struct OneEdition;

    impl EditionFetcher for OneEdition {
        fn fetch<'a>(&'a self, _edition_id: &'a str) -> BoxFuture<'a, verbum_core::Result<String>> {
            Box::pin(async { Ok(DOC.to_string()) })
        }
    }

    struct Echo;

    impl CommentaryBackend for Echo {
        fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, verbum_core::Result<String>> {
            Box::pin(async { Ok("commentary".to_string()) })
        }
    }

    async fn app() -> App {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(TextSource::new(Arc::new(OneEdition), store.clone()));
        let mut nav = NavigationState::new(source, EditionCatalog::default(), Cursor::new("LATVUL", "Genesis", 1));
        nav.load_chapter().await;
        App::new(nav, CommentaryState::new(store, 8), Arc::new(Echo))
    }

    async fn settle(app: &mut App) {
        while app.is_pending() {
            tokio::task::yield_now().await;
            app.poll_commentary().await;
        }
    }

    #[tokio::test]
    async fn test_word_cursor_wraps_between_verses() {
        let mut app = app().await;

        for _ in 0..7 {
            app.next_word();
        }
        assert_eq!((app.verse_idx, app.word_idx), (1, 0));

        app.prev_word();
        assert_eq!((app.verse_idx, app.word_idx), (0, 6));
        assert_eq!(app.focused_word().as_deref(), Some("terram."));
    }

    #[tokio::test]
    async fn test_continuous_mode_splits_on_punctuation() {
        let mut app = app().await;
        for _ in 0..6 {
            app.next_word();
        }
        app.toggle_continuous();
        assert_eq!(app.focused_word().as_deref(), Some("terram"));
    }

    #[tokio::test]
    async fn test_word_selection_fetches_commentary() {
        let mut app = app().await;
        app.next_word();
        app.select_focused_word();

        app.sync_commentary().await;
        assert!(app.commentary.is_loading());
        settle(&mut app).await;

        assert_eq!(app.commentary.response(), "commentary");
        assert!(!app.commentary.is_loading());
    }

    #[tokio::test]
    async fn test_verse_selection_shows_note() {
        let mut app = app().await;
        app.select_focused_verse();

        app.sync_commentary().await;
        assert!(!app.is_pending());
        assert_eq!(app.commentary.response(), "Creation.");
        assert_eq!(app.available_tabs().len(), 5);
    }

    #[tokio::test]
    async fn test_chapter_change_resets_cursor_and_selection() {
        let mut app = app().await;
        app.next_verse();
        app.select_focused_verse();

        app.next_chapter().await;
        assert_eq!(app.verse_idx, 0);
        assert!(app.nav.selection().current().is_empty());

        app.sync_commentary().await;
        assert_eq!(app.commentary.response(), "");
    }

    #[tokio::test]
    async fn test_scroll_follows_wrapped_verse_heights() {
        let mut app = app().await;
        app.content_height = 4;
        // Verse 1 wraps to three rows, each verse is followed by a blank row
        app.set_verse_rows(vec![(0, 3), (4, 2)]);

        app.next_verse();
        assert_eq!(app.content_scroll, 2);

        app.prev_verse();
        assert_eq!(app.content_scroll, 0);
    }

    #[tokio::test]
    async fn test_scroll_pins_tall_verse_at_its_first_row() {
        let mut app = app().await;
        app.content_height = 3;
        app.set_verse_rows(vec![(0, 1), (2, 6)]);

        app.next_verse();
        assert_eq!(app.content_scroll, 2);

        app.set_verse_rows(vec![(0, 1), (2, 1)]);
        app.content_scroll = 5;
        app.scroll_to_focused_verse();
        assert_eq!(app.content_scroll, 0);
    }

    #[tokio::test]
    async fn test_chapter_picker_sets_chapter() {
        let mut app = app().await;
        app.open_picker(Picker::Chapter);
        assert_eq!(app.picker_state.selected(), Some(0));

        app.picker_down();
        app.confirm_picker().await;
        assert_eq!(app.picker, None);
        assert_eq!(app.nav.cursor().chapter, Some(2));
    }
}
