//! Previous/next lookup over the ordered title index

use serde::Serialize;
use thiserror::Error;

use crate::content::TitleIndexEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjacencyError {
    #[error("`{0}` is not in the title index")]
    NotFound(String),
}

/// Entries surrounding a subject in the title index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Adjacent<'a> {
    pub prev: Option<&'a TitleIndexEntry>,
    pub next: Option<&'a TitleIndexEntry>,
}

impl Adjacent<'_> {
    /// No neighbours on either side
    pub fn none() -> Self {
        Self::default()
    }
}

/// Find the entries right before and after `subject_id`.
///
/// The index is taken in the order given; it is never sorted here. An empty
/// index has no neighbours for anyone, while a subject missing from a
/// non-empty index is reported as [`AdjacencyError::NotFound`].
pub fn resolve_adjacent<'a>(
    index: &'a [TitleIndexEntry],
    subject_id: &str,
) -> Result<Adjacent<'a>, AdjacencyError> {
    if index.is_empty() {
        return Ok(Adjacent::none());
    }

    let pos = index
        .iter()
        .position(|entry| entry.id == subject_id)
        .ok_or_else(|| AdjacencyError::NotFound(subject_id.to_string()))?;

    Ok(Adjacent {
        prev: pos.checked_sub(1).and_then(|p| index.get(p)),
        next: index.get(pos + 1),
    })
}
