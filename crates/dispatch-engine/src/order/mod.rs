//! Order state for the dispatch engine
//!
//! An order is one completed intake (address, image, final price, payment
//! mode) moving through the acceptance lifecycle. The store is the
//! authoritative in-memory table of every in-flight order, keyed by the token
//! the allocator issued for it; completed orders are removed, not archived.
//! Durable persistence, if any, is an external store's concern.

pub mod store;
pub mod token;
pub mod types;

pub use store::OrderStore;
pub use token::TokenAllocator;
pub use types::{MediaRef, Order, OrderDetails, OrderStatus, OrderToken, PaymentMode};
