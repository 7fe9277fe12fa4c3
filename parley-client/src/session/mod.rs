mod peer_session;
mod session_context;

pub use peer_session::*;
pub use session_context::*;
