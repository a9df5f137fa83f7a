use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
    #[serde(rename = "AP")]
    Apocrypha,
}

impl Testament {
    pub fn label(&self) -> &'static str {
        match self {
            Testament::Old => "Old Testament",
            Testament::New => "New Testament",
            Testament::Apocrypha => "Apocrypha",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub verse: u32,
    pub text: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Verse {
    /// Fully-qualified "Book Chapter:Verse" reference
    pub fn reference(&self, book: &str, chapter: u32) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} {}:{}", book, chapter, self.verse),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub verses: Vec<Verse>,
}

impl Chapter {
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn verse(&self, number: u32) -> Option<&Verse> {
        self.verses.iter().find(|v| v.verse == number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(alias = "book")]
    pub name: String,
    #[serde(rename = "bookNumber", default)]
    pub book_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testament: Option<Testament>,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.chapter == number)
    }
}

/// Full text of one edition as served from `/bibles/{id}.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub books: Vec<Book>,
}

/// Editions arrive either wrapped in a document or as a bare list of books
#[derive(Deserialize)]
#[serde(untagged)]
enum EditionDocument {
    Wrapped(EditionData),
    Books(Vec<Book>),
}

impl EditionData {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut data = match serde_json::from_str(json)? {
            EditionDocument::Wrapped(data) => data,
            EditionDocument::Books(books) => EditionData {
                title: None,
                id: None,
                books,
            },
        };
        data.fill_ordinals();
        Ok(data)
    }

    /// Give every chapter its "Book N" name and every verse its "Book N:V" name
    pub fn fill_display_names(&mut self) {
        for book in &mut self.books {
            for chapter in &mut book.chapters {
                if chapter.name.is_none() {
                    chapter.name = Some(format!("{} {}", book.name, chapter.chapter));
                }
                for verse in &mut chapter.verses {
                    if verse.name.is_none() {
                        verse.name = Some(format!("{} {}:{}", book.name, chapter.chapter, verse.verse));
                    }
                }
            }
        }
    }

    /// Books without a `bookNumber` take their 1-based list position
    fn fill_ordinals(&mut self) {
        for (i, book) in self.books.iter_mut().enumerate() {
            if book.book_number == 0 {
                book.book_number = i as u32 + 1;
            }
        }
    }

    pub fn book(&self, name: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.name == name)
    }

    pub fn book_by_ordinal(&self, ordinal: u32) -> Option<&Book> {
        self.books.iter().find(|b| b.book_number == ordinal)
    }

    pub fn summaries(&self) -> Vec<BookSummary> {
        self.books
            .iter()
            .map(|b| BookSummary {
                name: b.name.clone(),
                ordinal: b.book_number,
                testament: b.testament,
                chapter_count: b.chapters.len() as u32,
            })
            .collect()
    }
}

/// Lightweight book listing used by navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub name: String,
    pub ordinal: u32,
    pub testament: Option<Testament>,
    pub chapter_count: u32,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
