// Realtime document store client (REST pull + SSE subscription)
use crate::application::reading_source::{ReadingSource, SourceError, SourceItem};
use crate::domain::reading::RawReading;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Client for the store's single logical address. The store speaks REST
/// for one-shot reads (`GET <base>/<path>.json`) and server-sent events for
/// the standing subscription (same URL with `Accept: text/event-stream`).
#[derive(Debug, Clone)]
pub struct RealtimeStoreClient {
    base_url: String,
    path: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

/// Envelope of one `put`/`patch` event. `data` is null when the address
/// holds no payload.
#[derive(Debug, Deserialize)]
struct StreamEnvelope {
    #[allow(dead_code)]
    path: String,
    data: Option<RawReading>,
}

impl RealtimeStoreClient {
    pub fn new(base_url: String, path: String, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path,
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self) -> String {
        let mut url = format!("{}/{}.json", self.base_url, self.path);
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    async fn run_subscription(self, tx: mpsc::Sender<SourceItem>) {
        loop {
            match self.stream_events(&tx).await {
                Ok(()) => tracing::debug!("event stream ended, reconnecting"),
                Err(e) => {
                    tracing::warn!("event stream error: {e}");
                    if tx
                        .send(Err(SourceError::Unavailable(e.to_string())))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }

            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn stream_events(&self, tx: &mpsc::Sender<SourceItem>) -> anyhow::Result<()> {
        let response = self
            .client
            .get(self.build_url())
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        anyhow::ensure!(
            response.status().is_success(),
            "event stream request failed with status {}",
            response.status()
        );

        let events = sse_events(response.bytes_stream());
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            let (name, data) = event?;
            if let Some(item) = parse_event(&name, &data) {
                if tx.send(item).await.is_err() {
                    // Receiver torn down; stop delivering
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

/// Split a byte stream into (event, data) pairs per the server-sent-events
/// framing: `event:`/`data:` lines terminated by a blank line.
fn sse_events<S, E>(body: S) -> impl futures::Stream<Item = anyhow::Result<(String, String)>>
where
    S: futures::Stream<Item = Result<bytes::Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::try_stream! {
        futures::pin_mut!(body);
        let mut buffer = String::new();
        let mut event_name = String::new();
        let mut data_line = String::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim_end_matches('\r').to_string();
                buffer.drain(..=newline);

                if line.is_empty() {
                    // Blank line terminates one event
                    if !event_name.is_empty() || !data_line.is_empty() {
                        yield (
                            std::mem::take(&mut event_name),
                            std::mem::take(&mut data_line),
                        );
                    }
                } else if let Some(rest) = line.strip_prefix("event:") {
                    event_name = rest.trim().to_string();
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_line = rest.trim().to_string();
                }
            }
        }
    }
}

/// Map one SSE event to a source item. Keep-alives and unknown events are
/// skipped; undecodable payloads (e.g. a partial patch) are logged and
/// skipped rather than surfaced as errors.
fn parse_event(event: &str, data: &str) -> Option<SourceItem> {
    match event {
        "put" | "patch" => match serde_json::from_str::<StreamEnvelope>(data) {
            Ok(envelope) => Some(Ok(envelope.data)),
            Err(e) => {
                tracing::warn!("undecodable {event} event payload: {e}");
                None
            }
        },
        "auth_revoked" => Some(Err(SourceError::Unavailable(
            "source revoked the subscription credentials".to_string(),
        ))),
        "cancel" => Some(Err(SourceError::Unavailable(
            "source cancelled the subscription".to_string(),
        ))),
        _ => None,
    }
}

#[async_trait]
impl ReadingSource for RealtimeStoreClient {
    async fn fetch_current(&self) -> SourceItem {
        let response = self
            .client
            .get(self.build_url())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "pull request failed with status {}",
                response.status()
            )));
        }

        // A null body is a valid no-data state, not an error
        response
            .json::<Option<RawReading>>()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))
    }

    async fn subscribe(&self) -> mpsc::Receiver<SourceItem> {
        let (tx, rx) = mpsc::channel(32);
        let client = self.clone();
        tokio::spawn(client.run_subscription(tx));
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_auth_token() {
        let client = RealtimeStoreClient::new(
            "https://store.example.com/".to_string(),
            "WaterQuality".to_string(),
            Some("se cret&1".to_string()),
        );
        assert_eq!(
            client.build_url(),
            "https://store.example.com/WaterQuality.json?auth=se%20cret%261"
        );

        let client = RealtimeStoreClient::new(
            "https://store.example.com".to_string(),
            "WaterQuality".to_string(),
            None,
        );
        assert_eq!(
            client.build_url(),
            "https://store.example.com/WaterQuality.json"
        );
    }

    #[test]
    fn test_parse_put_event() {
        let data = r#"{"path":"/","data":{"pH":7.2,"TDS":250,"Temperature":18.5}}"#;
        let item = parse_event("put", data).unwrap().unwrap();
        let raw = item.unwrap();
        assert_eq!(raw.ph, 7.2);
        assert_eq!(raw.tds, 250.0);
        assert_eq!(raw.temperature, 18.5);
    }

    #[test]
    fn test_parse_put_with_null_data_is_no_data() {
        let item = parse_event("put", r#"{"path":"/","data":null}"#).unwrap();
        assert!(item.unwrap().is_none());
    }

    #[test]
    fn test_keep_alive_and_unknown_events_are_skipped() {
        assert!(parse_event("keep-alive", "null").is_none());
        assert!(parse_event("", "").is_none());
    }

    #[test]
    fn test_auth_revoked_surfaces_as_unavailable() {
        let item = parse_event("auth_revoked", "credential").unwrap();
        assert!(item.is_err());
    }

    #[test]
    fn test_undecodable_payload_is_skipped() {
        assert!(parse_event("patch", r#"{"path":"/pH","data":6.9}"#).is_none());
    }

    #[tokio::test]
    async fn test_sse_framing_survives_chunk_boundaries() {
        let chunks: Vec<Result<bytes::Bytes, std::convert::Infallible>> = vec![
            Ok(bytes::Bytes::from("event: put\ndata: {\"pa")),
            Ok(bytes::Bytes::from(
                "th\":\"/\",\"data\":null}\n\nevent: keep-alive\ndata: null\n\n",
            )),
        ];

        let events: Vec<_> = sse_events(futures::stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 2);
        let (name, data) = events[0].as_ref().unwrap();
        assert_eq!(name, "put");
        assert_eq!(data, r#"{"path":"/","data":null}"#);
        let (name, _) = events[1].as_ref().unwrap();
        assert_eq!(name, "keep-alive");
    }
}
