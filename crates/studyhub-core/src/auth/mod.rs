//! Authentication state.
//!
//! - `SessionManager`: the single owner of the logged-in user and tokens,
//!   persisted through a `KeyValueStore` and observable via a watch channel
//! - `token`: advisory JWT expiry checks (payload only, no signature)

pub mod session;
pub mod token;

pub use session::{RestoreOutcome, Session, SessionEvent, SessionManager};
pub use token::Claims;
