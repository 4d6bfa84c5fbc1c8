//! Server-push event source over plain HTTP, for hosts outside the browser.
//!
//! Behaves like the browser's `EventSource`: it reports `Open` when the
//! server answers `200` with a `text/event-stream` body, delivers the `data`
//! of every default-typed event, raises `Error` when the connection drops and
//! then reconnects on its own after the reconnection delay (honouring the
//! server's `retry:` field and resuming with `Last-Event-ID`). A response with
//! any other status or content type fails the connection: `Error` is raised
//! once and the source ends.

use crate::error::{stream_error, Error, StreamErrorKind};
use crate::source::{EventSource, ReadyState, SourceEvent, StreamConnector};
use async_stream::stream;
use eventsource_stream::Eventsource;
use futures_util::stream::{LocalBoxStream, StreamExt};
use log::*;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Default delay before reconnecting after a dropped connection.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

const EVENT_STREAM_MIME: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "Last-Event-ID";
const DEFAULT_EVENT_TYPE: &str = "message";

/// Opens [`HttpEventSource`]s sharing one HTTP client.
#[derive(Clone)]
pub struct HttpConnector {
    client: Client,
    reconnect_delay: Duration,
}

impl HttpConnector {
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(format!("mail-bridge/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        })
    }

    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }
}

impl StreamConnector for HttpConnector {
    fn connect(&self, url: &str) -> Result<Box<dyn EventSource>, Error> {
        let source = HttpEventSource::new(self.client.clone(), url, self.reconnect_delay)?;
        Ok(Box::new(source))
    }
}

/// One HTTP server-push connection, reconnecting until dropped.
pub struct HttpEventSource {
    client: Client,
    url: Url,
    reconnect_delay: Duration,
}

impl HttpEventSource {
    /// Validate `url` and prepare the connection. Nothing is sent until the
    /// source is wired with [`EventSource::into_events`].
    pub fn new(client: Client, url: &str, reconnect_delay: Duration) -> Result<Self, Error> {
        let url = Url::parse(url)
            .map_err(|e| stream_error(StreamErrorKind::InvalidUrl, &format!("{url}: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(Self {
                client,
                url,
                reconnect_delay,
            }),
            scheme => Err(stream_error(
                StreamErrorKind::InvalidUrl,
                &format!("unsupported scheme {scheme}"),
            )),
        }
    }
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with(EVENT_STREAM_MIME))
        .unwrap_or(false)
}

impl EventSource for HttpEventSource {
    fn ready_state(&self) -> ReadyState {
        ReadyState::Connecting
    }

    fn into_events(self: Box<Self>) -> LocalBoxStream<'static, SourceEvent> {
        let HttpEventSource {
            client,
            url,
            mut reconnect_delay,
        } = *self;

        let events = stream! {
            let mut last_event_id: Option<String> = None;

            loop {
                let mut request = client
                    .get(url.clone())
                    .header(ACCEPT, EVENT_STREAM_MIME)
                    .header(CACHE_CONTROL, "no-cache");
                if let Some(id) = &last_event_id {
                    request = request.header(LAST_EVENT_ID, id.as_str());
                }

                match request.send().await {
                    Ok(response) if response.status() == StatusCode::OK && is_event_stream(&response) => {
                        debug!("Event stream open at {url}");
                        yield SourceEvent::Open;

                        let mut frames = response.bytes_stream().eventsource();
                        while let Some(frame) = frames.next().await {
                            match frame {
                                Ok(event) => {
                                    if !event.id.is_empty() {
                                        last_event_id = Some(event.id.clone());
                                    }
                                    if let Some(retry) = event.retry {
                                        reconnect_delay = retry;
                                    }
                                    if event.event.is_empty() || event.event == DEFAULT_EVENT_TYPE {
                                        yield SourceEvent::Message(event.data);
                                    } else {
                                        trace!("Ignoring named event {} from {url}", event.event);
                                    }
                                }
                                Err(e) => {
                                    warn!("Event stream at {url} broke: {e}");
                                    break;
                                }
                            }
                        }

                        info!("Event stream at {url} dropped, reconnecting in {reconnect_delay:?}");
                        yield SourceEvent::Error;
                    }
                    Ok(response) => {
                        warn!(
                            "Event stream at {url} rejected with status {} ({:?})",
                            response.status(),
                            response.headers().get(CONTENT_TYPE)
                        );
                        yield SourceEvent::Error;
                        break;
                    }
                    Err(e) => {
                        warn!("Event stream at {url} unreachable: {e}");
                        yield SourceEvent::Error;
                    }
                }

                tokio::time::sleep(reconnect_delay).await;
            }
        };

        events.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unparseable_url() {
        let err = HttpEventSource::new(Client::new(), "not a url", DEFAULT_RECONNECT_DELAY)
            .err()
            .unwrap();
        assert_eq!(
            err.error_kind,
            crate::error::ErrorKind::Stream(StreamErrorKind::InvalidUrl)
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = HttpEventSource::new(
            Client::new(),
            "ftp://localhost/api/stream/emails/app-1",
            DEFAULT_RECONNECT_DELAY,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_source_is_connecting() {
        let source = HttpEventSource::new(
            Client::new(),
            "http://localhost:8080/api/stream/emails/app-1",
            DEFAULT_RECONNECT_DELAY,
        )
        .unwrap();
        assert_eq!(source.ready_state(), ReadyState::Connecting);
    }

    #[test]
    fn test_connector_reconnect_delay_is_configurable() {
        let connector = HttpConnector::new()
            .unwrap()
            .with_reconnect_delay(Duration::from_millis(250));
        assert_eq!(connector.reconnect_delay(), Duration::from_millis(250));
    }
}
