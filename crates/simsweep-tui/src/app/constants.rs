//! Application constants.

/// Number of items to move when pressing Page Up/Down.
pub const PAGE_SIZE: usize = 10;

/// Channel buffer size for backend results.
pub const BACKEND_CHANNEL_SIZE: usize = 64;

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 50;

/// Similarity change per `+`/`-` press, in percent.
pub const SIMILARITY_STEP: i16 = 1;
