//! Session tokens and the ownership-based access guard.
//!
//! Tokens are opaque random hex strings held only in memory; a user has at
//! most one at a time and it never expires on its own.

pub mod guard;
pub mod session;

pub use guard::{authenticate, authorize, authorize_create, AccessError};
pub use session::{Session, SessionError, SessionRegistry};
