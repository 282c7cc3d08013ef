//! Short-term memory and session lifecycle (spec.md §4.7): the buffer of
//! observed events between learns, sliding-TTL session storage, and the
//! auto-learn trigger.

pub mod session;
pub mod session_store;
pub mod stm;

pub use session::Session;
pub use session_store::{InMemorySessionStore, SessionStore};

pub mod prelude {
    pub use crate::session::Session;
    pub use crate::session_store::{InMemorySessionStore, SessionStore};
    pub use crate::stm::{learn, observe};
}
