use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// A single catalog record with bibliographic and reading-progress fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, assigned at creation
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    /// Always `read_page == page_count`
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Build a freshly inserted record.
    pub(crate) fn new(id: String, fields: BookFields, now: OffsetDateTime) -> Self {
        Self {
            id,
            finished: fields.is_finished(),
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every mutable field; `id` and `inserted_at` are kept.
    pub(crate) fn apply(&mut self, fields: BookFields, now: OffsetDateTime) {
        self.finished = fields.is_finished();
        self.name = fields.name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.reading = fields.reading;
        self.updated_at = now;
    }

    pub fn brief(&self) -> BookBrief {
        BookBrief {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Reduced view returned by list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBrief {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

/// Request body for creating or replacing a book.
///
/// Every field is optional at the wire level; [`BookPayload::validate`]
/// decides what is acceptable before any record is touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

impl BookPayload {
    /// Check the name first, then reading progress against the page count.
    pub fn validate(self) -> Result<BookFields, ValidationError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ValidationError::MissingName),
        };

        if self.read_page > self.page_count {
            return Err(ValidationError::PageOverflow {
                read_page: self.read_page,
                page_count: self.page_count,
            });
        }

        Ok(BookFields {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// Validated book fields; `read_page <= page_count` and `name` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookFields {
    fn is_finished(&self) -> bool {
        self.read_page == self.page_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing name")]
    MissingName,
    #[error("page overflow: readPage {read_page} exceeds pageCount {page_count}")]
    PageOverflow { read_page: u32, page_count: u32 },
}

/// List filters, combined with AND. Absent fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    /// Case-insensitive substring of the book name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub reading: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub finished: Option<bool>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(needle) = self.name.as_deref().filter(|name| !name.is_empty()) {
            if !book.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        self.reading.map_or(true, |reading| book.reading == reading)
            && self.finished.map_or(true, |finished| book.finished == finished)
    }
}

/// Query flags arrive as `0`/`1`; `false`/`true` are accepted too.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None => Ok(None),
        Some("1") | Some("true") => Ok(Some(true)),
        Some("0") | Some("false") => Ok(Some(false)),
        Some(other) => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"0 or 1",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> BookPayload {
        serde_json::from_value(value).unwrap()
    }

    fn sample_book(name: &str, reading: bool, page_count: u32, read_page: u32) -> Book {
        let fields = BookPayload {
            name: Some(name.to_string()),
            page_count,
            read_page,
            reading,
            ..BookPayload::default()
        }
        .validate()
        .unwrap();
        Book::new("id".to_string(), fields, OffsetDateTime::now_utc())
    }

    #[test]
    fn missing_name_is_rejected_regardless_of_other_fields() {
        let err = payload(json!({"pageCount": 10, "readPage": 5})).validate();
        assert_eq!(err, Err(ValidationError::MissingName));

        let err = payload(json!({"name": null, "pageCount": 10, "readPage": 50})).validate();
        assert_eq!(err, Err(ValidationError::MissingName));

        let err = payload(json!({"name": "", "author": "Someone"})).validate();
        assert_eq!(err, Err(ValidationError::MissingName));
    }

    #[test]
    fn read_page_beyond_page_count_is_rejected() {
        let err = payload(json!({"name": "B", "pageCount": 100, "readPage": 150})).validate();
        assert_eq!(
            err,
            Err(ValidationError::PageOverflow {
                read_page: 150,
                page_count: 100
            })
        );
    }

    #[test]
    fn omitted_counts_default_to_zero() {
        let fields = payload(json!({"name": "Empty"})).validate().unwrap();
        assert_eq!(fields.page_count, 0);
        assert_eq!(fields.read_page, 0);
        assert!(!fields.reading);
    }

    #[test]
    fn negative_page_count_does_not_deserialize() {
        let result = serde_json::from_value::<BookPayload>(json!({"name": "X", "pageCount": -1}));
        assert!(result.is_err());
    }

    #[test]
    fn finished_follows_read_page() {
        assert!(sample_book("Done", false, 100, 100).finished);
        assert!(!sample_book("Halfway", true, 100, 50).finished);
    }

    #[test]
    fn apply_keeps_identity_and_insertion_time() {
        let mut book = sample_book("Draft", true, 10, 1);
        let inserted_at = book.inserted_at;
        let later = inserted_at + time::Duration::seconds(5);

        let fields = payload(json!({"name": "Final", "pageCount": 10, "readPage": 10}))
            .validate()
            .unwrap();
        book.apply(fields, later);

        assert_eq!(book.id, "id");
        assert_eq!(book.name, "Final");
        assert!(book.finished);
        assert!(!book.reading);
        assert_eq!(book.inserted_at, inserted_at);
        assert_eq!(book.updated_at, later);
    }

    #[test]
    fn book_serializes_camel_case() {
        let book = sample_book("Dune", true, 412, 12);
        let value = serde_json::to_value(&book).unwrap();
        for key in ["pageCount", "readPage", "insertedAt", "updatedAt", "finished"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["insertedAt"], value["updatedAt"]);
    }

    #[test]
    fn filter_matches_name_case_insensitively() {
        let filter = BookFilter {
            name: Some("WAR".to_string()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&sample_book("War and Peace", false, 1, 0)));
        assert!(filter.matches(&sample_book("The Art of war", false, 1, 0)));
        assert!(!filter.matches(&sample_book("Dune", false, 1, 0)));
    }

    #[test]
    fn empty_name_filter_matches_everything() {
        let filter = BookFilter {
            name: Some(String::new()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&sample_book("Dune", false, 1, 0)));
    }

    #[test]
    fn filter_flags_parse_strictly() {
        let filter: BookFilter =
            serde_json::from_value(json!({"reading": "1", "finished": "0"})).unwrap();
        assert_eq!(filter.reading, Some(true));
        assert_eq!(filter.finished, Some(false));

        let filter: BookFilter = serde_json::from_value(json!({"reading": "true"})).unwrap();
        assert_eq!(filter.reading, Some(true));
        assert_eq!(filter.finished, None);

        let err = serde_json::from_value::<BookFilter>(json!({"reading": "yes"})).unwrap_err();
        assert!(err.to_string().contains("0 or 1"));
    }

    #[test]
    fn filter_flags_combine_with_and() {
        let filter = BookFilter {
            reading: Some(true),
            finished: Some(false),
            ..BookFilter::default()
        };
        assert!(filter.matches(&sample_book("Open", true, 10, 3)));
        assert!(!filter.matches(&sample_book("Closed", true, 10, 10)));
        assert!(!filter.matches(&sample_book("Shelved", false, 10, 3)));
    }
}
