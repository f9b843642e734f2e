//! Listing module - incremental page loading and previous/next resolution

mod adjacency;
mod loader;

pub use adjacency::{resolve_adjacent, Adjacent, AdjacencyError};
pub use loader::{BoxError, ListPage, ListState, LoadError, PaginatedListLoader};
