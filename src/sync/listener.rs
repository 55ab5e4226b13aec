use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use tokio::{net::TcpStream, time::sleep};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::{
    error::{SyncError, SyncResult},
    source::SnapshotSource,
    view::ViewHandle,
};
use crate::state::fact::Fact;

type RelayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reconnect delays for the relay subscription.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Delay before the first reconnect.
    pub initial: Duration,
    /// Cap of the doubling delay.
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(10),
        }
    }
}

/// Build the display relay address (`ws[s]://host/ws?role=display`) from an HTTP base url.
pub fn relay_url(server_url: &str) -> SyncResult<String> {
    let base = server_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(SyncError::InvalidUrl(server_url.to_owned()));
    };
    Ok(format!("{ws_base}/ws?role=display"))
}

/// Subscribes to the relay as a display and applies every fact to the view.
///
/// A snapshot is pulled after each successful (re)connect, covering whatever
/// was missed while disconnected.
pub struct FactListener {
    url: String,
    view: ViewHandle,
    source: Arc<dyn SnapshotSource>,
    backoff: Backoff,
}

impl FactListener {
    /// Listener for the relay at `server_url`, feeding `view`.
    pub fn new(server_url: &str, view: ViewHandle, source: Arc<dyn SnapshotSource>) -> SyncResult<Self> {
        Ok(Self {
            url: relay_url(server_url)?,
            view,
            source,
            backoff: Backoff::default(),
        })
    }

    /// Replace the default reconnect delays.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Keep the subscription alive forever.
    pub async fn run(self) {
        let mut delay = self.backoff.initial;
        loop {
            match self.connect().await {
                Ok(stream) => {
                    delay = self.backoff.initial;
                    info!(url = %self.url, "subscribed to relay");
                    self.resync().await;
                    match self.follow(stream).await {
                        Ok(()) => info!("relay closed the connection"),
                        Err(err) => warn!(error = %err, "relay connection lost"),
                    }
                }
                Err(err) => warn!(error = %err, "relay connection attempt failed"),
            }
            sleep(delay).await;
            delay = (delay * 2).min(self.backoff.max);
        }
    }

    async fn connect(&self) -> SyncResult<RelayStream> {
        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|source| SyncError::Connect {
                url: self.url.clone(),
                source: Box::new(source),
            })?;
        Ok(stream)
    }

    async fn resync(&self) {
        match self.source.fetch().await {
            Ok(snapshot) => {
                if self.view.replace(snapshot) {
                    info!("local view reconciled after connect");
                }
            }
            Err(err) => warn!(error = %err, "snapshot pull after connect failed"),
        }
    }

    async fn follow(&self, mut stream: RelayStream) -> SyncResult<()> {
        while let Some(message) = stream.next().await {
            match message.map_err(|err| SyncError::Transport(Box::new(err)))? {
                Message::Text(text) => self.handle_text(&text),
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_text(&self, text: &str) {
        match serde_json::from_str::<Fact>(text) {
            Ok(fact) => {
                let kind = fact.kind();
                if self.view.apply_fact(&fact) {
                    debug!(kind, "applied fact");
                }
            }
            Err(_) => debug!(payload = %text, "ignoring non-fact relay message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_url_follows_the_http_scheme() {
        assert_eq!(
            relay_url("http://localhost:8080/").unwrap(),
            "ws://localhost:8080/ws?role=display"
        );
        assert_eq!(
            relay_url("https://awards.example").unwrap(),
            "wss://awards.example/ws?role=display"
        );
        assert!(matches!(
            relay_url("ftp://awards.example"),
            Err(SyncError::InvalidUrl(_))
        ));
    }
}
