use std::cmp::Ordering;

use super::{Document, FieldValue};

/// Pseudo-field name matching a document's identifier in filters and sorts.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// AND of exact-match filters, an optional single sort, and a page.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub filters: Vec<(String, FieldValue)>,
    pub start: usize,
    pub rows: usize,
    pub sort: Option<(String, SortOrder)>,
}

impl Default for IndexQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexQuery {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            start: 0,
            rows: usize::MAX,
            sort: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Whether every filter matches the document exactly.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|(field, expected)| {
            if field == ID_FIELD {
                return expected.as_text() == Some(document.id.as_str());
            }
            document.get(field) == Some(expected)
        })
    }

    /// Compare two documents on the sort field. Documents without the field
    /// sort last regardless of the order.
    pub(crate) fn compare(&self, left: &Document, right: &Document) -> Ordering {
        let Some((field, order)) = &self.sort else {
            return Ordering::Equal;
        };
        let (left, right) = if field == ID_FIELD {
            (
                Some(FieldValue::Text(left.id.clone())),
                Some(FieldValue::Text(right.id.clone())),
            )
        } else {
            (left.get(field).cloned(), right.get(field).cloned())
        };

        match (left, right) {
            (Some(left), Some(right)) => {
                let ordering = compare_values(&left, &right);
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

fn compare_values(left: &FieldValue, right: &FieldValue) -> Ordering {
    match (left, right) {
        (FieldValue::Text(l), FieldValue::Text(r)) => l.cmp(r),
        (FieldValue::Integer(l), FieldValue::Integer(r)) => l.cmp(r),
        (FieldValue::Date(l), FieldValue::Date(r)) => l.cmp(r),
        _ => match (left.as_double(), right.as_double()) {
            (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// A page of matching documents plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResponse {
    pub documents: Vec<Document>,
    pub num_found: u64,
}
