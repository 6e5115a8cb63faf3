//! zweb: cookie-bound sessions and paired request/reply handling on
//! top of axum.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod context;
pub mod diagnostics;
pub mod dispatch;
pub mod media;
pub mod normalize;
pub mod runtime;
pub mod state;
pub mod transport;

pub use context::{ContextState, OptionalContext, RequestContext};
pub use dispatch::{dispatch, Handler};
pub use runtime::WebRuntime;
pub use transport::{AxumTransport, Transport};
