//! The fixed catalog of editions known to the reader

use serde::{Deserialize, Serialize};

/// Edition carrying the Hebrew text for cross-edition prompts
pub const HEBREW_EDITION: &str = "WLC";
/// Edition carrying the Greek text for cross-edition prompts
pub const GREEK_EDITION: &str = "LXXTR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub id: String,
    pub title: String,
}

impl Edition {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    /// Three-letter label for the header button
    pub fn short_label(&self) -> &str {
        match self.id.char_indices().nth(3) {
            Some((i, _)) => &self.id[..i],
            None => &self.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionCatalog {
    editions: Vec<Edition>,
}

impl EditionCatalog {
    pub fn new(editions: Vec<Edition>) -> Self {
        Self { editions }
    }

    pub fn all(&self) -> &[Edition] {
        &self.editions
    }

    pub fn len(&self) -> usize {
        self.editions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editions.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Edition> {
        self.editions.iter().find(|e| e.id == id)
    }

    /// Next edition in the closed rotation. Unknown or absent ids start over at the first entry.
    pub fn next_after(&self, id: Option<&str>) -> Option<&Edition> {
        let position = id.and_then(|id| self.editions.iter().position(|e| e.id == id));
        match position {
            Some(i) => self.editions.get((i + 1) % self.editions.len()),
            None => self.editions.first(),
        }
    }
}

impl Default for EditionCatalog {
    fn default() -> Self {
        Self::new(vec![
            Edition::new("LATVUL", "Latin Vulgate"),
            Edition::new("ENGVUL", "English Vulgate"),
            Edition::new("KJV", "King James Version"),
            Edition::new(GREEK_EDITION, "Greek Septuagint & Textus Receptus"),
            Edition::new(HEBREW_EDITION, "Masoretic Hebrew"),
        ])
    }
}
