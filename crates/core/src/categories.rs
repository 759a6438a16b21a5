//! Well-known highlight category name constants.
//!
//! These must match the `category` values stored in the
//! `highlight_selections` and `spotlight_entries` tables and the keys
//! registered in the provider registry.

/// Feature films from the movie archive.
pub const CATEGORY_MOVIE: &str = "movie";

/// Albums and tracks from the music archive (fed by the listening sync).
pub const CATEGORY_MUSIC: &str = "music";

/// Books from the reading archive.
pub const CATEGORY_BOOK: &str = "book";

/// Quotes from the quote collection.
pub const CATEGORY_QUOTE: &str = "quote";

/// Video games from the game archive.
pub const CATEGORY_GAME: &str = "game";

/// Every category seeded into `highlight_selections` at first run, in
/// homepage display order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    CATEGORY_MOVIE,
    CATEGORY_MUSIC,
    CATEGORY_BOOK,
    CATEGORY_QUOTE,
    CATEGORY_GAME,
];
