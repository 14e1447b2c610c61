//! Customer/operator relay sessions
//!
//! After an operator accepts an order, the two parties talk through an
//! ephemeral tunnel: anything one side sends is forwarded to the other,
//! labeled with the sender's role. The router owns the bidirectional mapping
//! behind that tunnel and nothing else; it does not deliver messages itself.

pub mod router;

pub use router::{RelayPayload, RoutedMessage, SessionRouter};
