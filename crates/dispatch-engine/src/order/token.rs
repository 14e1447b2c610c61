//! Order token issuance

use std::sync::atomic::{AtomicU64, Ordering};

use crate::order::types::OrderToken;

/// Issues strictly increasing, unique order tokens
///
/// Tokens start at 1 and are never reused for the process lifetime, even
/// after the order they identified completes. A single atomic increment makes
/// concurrent submissions safe without a lock.
///
/// # Examples
///
/// ```
/// use tiffin_dispatch_engine::order::TokenAllocator;
///
/// let allocator = TokenAllocator::new();
/// assert_eq!(allocator.next().0, 1);
/// assert_eq!(allocator.next().0, 2);
/// ```
pub struct TokenAllocator {
    next: AtomicU64,
}

impl TokenAllocator {
    /// Create an allocator whose first token is 1
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issue the next token
    pub fn next(&self) -> OrderToken {
        OrderToken(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TokenAllocator {
    fn default() -> Self {
        Self::new()
    }
}
