//! Cookie-bound session state for zweb.
//!
//! A [`SessionRegistry`] maps opaque session ids to shared [`Session`]
//! objects.  Requests carry the id in the `app_session_id` cookie; an
//! absent or unknown id gets a fresh session and a `Set-Cookie`.

pub mod cookie;
pub mod registry;
pub mod session;

pub use cookie::{find_cookie, SetCookie, SESSION_COOKIE_NAME};
pub use registry::{IdSource, Resolution, SessionRegistry, SessionSummary, UuidIdSource};
pub use session::{Session, SessionHandle};
