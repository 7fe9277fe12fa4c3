use crate::provider::{LocalStream, PresentationSurface};
use dashmap::DashMap;
use parley_core::ConnectionId;
use tracing::{debug, info};

/// Presentation surface that only logs; remembers which remote views are up.
#[derive(Default)]
pub struct TracingSurface {
    views: DashMap<ConnectionId, String>,
}

impl TracingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSurface for TracingSurface {
    fn show_local(&self, stream: &LocalStream) {
        info!(
            "Local preview on stream {} ({} tracks)",
            stream.id,
            stream.tracks.len()
        );
    }

    fn show_remote(&self, remote: &ConnectionId, track_id: &str) {
        info!("Showing remote view for {} (track {})", remote, track_id);
        self.views.insert(remote.clone(), track_id.to_string());
    }

    fn remove_remote(&self, remote: &ConnectionId) {
        match self.views.remove(remote) {
            Some(_) => info!("Removed remote view for {}", remote),
            None => debug!("No remote view to remove for {}", remote),
        }
    }
}
