pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use engine::ClientEngine;
pub use error::{ClientError, JoinError};
pub use provider::{
    ConnectionEvent, ConnectivityState, LocalStream, LocalTrack, MediaKind, MediaProvider,
    NegotiationProvider, PresentationSurface, StaticMedia, TracingSurface, WebRtcNegotiator,
};
pub use session::{
    NegotiationRole, PeerAction, PeerEvent, PeerPhase, PeerSession, SessionAction,
    SessionContext, ViewState,
};
pub use transport::{SignalingChannel, connect};
