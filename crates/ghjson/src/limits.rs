//! Bounds applied while decoding untrusted documents.

/// Maximum number of indices in a data-tree path.
pub const MAX_PATH_DEPTH: usize = 64;

/// Maximum length of a value prefix token.
pub const MAX_PREFIX_LEN: usize = 32;

/// Maximum number of characters accepted in a single numeric token.
pub const MAX_NUMBER_LEN: usize = 512;
