//! Span definitions per operation: storage, search, feedback, embedding.

/// Create a storage span.
#[macro_export]
macro_rules! storage_span {
    ($operation:expr, $content_id:expr) => {
        tracing::info_span!("folio.storage", operation = %$operation, content_id = %$content_id)
    };
}

/// Create a search span.
#[macro_export]
macro_rules! search_span {
    ($k:expr, $threshold:expr) => {
        tracing::info_span!("folio.search", k = $k, threshold = $threshold)
    };
}

/// Create a feedback span.
#[macro_export]
macro_rules! feedback_span {
    ($query_id:expr) => {
        tracing::info_span!("folio.feedback", query_id = %$query_id)
    };
}

/// Create an embedding span.
#[macro_export]
macro_rules! embedding_span {
    ($provider:expr, $dimension:expr) => {
        tracing::info_span!("folio.embedding", provider = %$provider, dimension = $dimension)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const STORAGE: &str = "folio.storage";
    pub const SEARCH: &str = "folio.search";
    pub const FEEDBACK: &str = "folio.feedback";
    pub const EMBEDDING: &str = "folio.embedding";
}
