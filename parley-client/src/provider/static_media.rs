use crate::provider::{LocalStream, LocalTrack, MediaKind, MediaProvider};
use anyhow::{Result, bail};
use async_trait::async_trait;
use uuid::Uuid;

/// Media provider for headless peers: hands out track handles without a
/// capture device behind them.
#[derive(Debug, Clone)]
pub struct StaticMedia {
    kinds: Vec<MediaKind>,
}

impl StaticMedia {
    pub fn new(kinds: Vec<MediaKind>) -> Self {
        Self { kinds }
    }

    pub fn audio_video() -> Self {
        Self::new(vec![MediaKind::Audio, MediaKind::Video])
    }

    pub fn audio_only() -> Self {
        Self::new(vec![MediaKind::Audio])
    }

    /// Behaves like a denied or missing capture device.
    pub fn unavailable() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl MediaProvider for StaticMedia {
    async fn acquire(&self) -> Result<LocalStream> {
        if self.kinds.is_empty() {
            bail!("no capture device available");
        }

        let stream_id = Uuid::new_v4().to_string();
        let tracks = self
            .kinds
            .iter()
            .map(|kind| LocalTrack {
                id: format!("{:?}-{}", kind, Uuid::new_v4()).to_lowercase(),
                kind: *kind,
            })
            .collect();

        Ok(LocalStream {
            id: stream_id,
            tracks,
        })
    }
}
