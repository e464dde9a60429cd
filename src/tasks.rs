//! Background tasks for non-blocking API calls.
//!
//! The main loop never awaits the network. It hands work to [`TaskSpawner`],
//! keeps rendering, and drains results from the channel with `try_recv()`:
//! 1. A list controller hands out a `PageRequest`
//! 2. The app passes it to `TaskSpawner::spawn_fetch_page`
//! 3. The task sends an `ApiMessage` back when the request completes
//! 4. The app routes the message to the controller that issued the request

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{ApiError, DataGateway, DeliveryClient, PageEnvelope};
use crate::controller::PageRequest;
use crate::screen::Screen;

/// Results sent from background tasks to the main loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// A list page arrived (or failed).
    PageFetched {
        /// Screen the request was issued for.
        screen: Screen,
        request: PageRequest,
        result: Result<PageEnvelope<Value>, ApiError>,
    },

    /// A complaint close request completed.
    ComplaintClosed {
        id: String,
        result: Result<(), ApiError>,
    },
}

pub type ApiReceiver = mpsc::UnboundedReceiver<ApiMessage>;

/// Spawns API calls on the tokio runtime.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Fetch one page; records stay untyped until the controller decodes them.
    pub fn spawn_fetch_page(
        &self,
        client: &DeliveryClient,
        screen: Screen,
        request: PageRequest,
    ) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client
                .get_page::<Value>(&request.endpoint, &request.query)
                .await;
            if tx
                .send(ApiMessage::PageFetched {
                    screen,
                    request,
                    result,
                })
                .is_err()
            {
                debug!("Main loop gone, dropping page result");
            }
        })
    }

    pub fn spawn_close_complaint(&self, client: &DeliveryClient, id: String) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.close_complaint(&id).await;
            if tx
                .send(ApiMessage::ComplaintClosed { id, result })
                .is_err()
            {
                debug!("Main loop gone, dropping complaint close result");
            }
        })
    }
}

/// Create the channel between background tasks and the main loop.
pub fn create_task_channel() -> (TaskSpawner, ApiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskSpawner::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Auth, QueryParams};
    use crate::controller::FetchMode;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_fetch_is_reported_through_channel() {
        let (spawner, mut rx) = create_task_channel();
        // Nothing listens on port 9 (discard); the connection is refused.
        let client = DeliveryClient::with_auth(
            "http://127.0.0.1:9",
            Auth::anonymous(),
            Duration::from_millis(200),
        )
        .unwrap();

        let request = PageRequest {
            generation: 3,
            endpoint: "orders".to_string(),
            query: QueryParams::new(),
            mode: FetchMode::Replace,
        };
        spawner.spawn_fetch_page(&client, Screen::Orders, request.clone());

        let message = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match message {
            ApiMessage::PageFetched {
                screen,
                request: echoed,
                result,
            } => {
                assert_eq!(screen, Screen::Orders);
                assert_eq!(echoed, request);
                assert!(result.is_err());
            }
            other => panic!("Expected PageFetched, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_result_dropped_when_main_loop_gone() {
        let (spawner, rx) = create_task_channel();
        drop(rx);
        let client = DeliveryClient::with_auth(
            "http://127.0.0.1:9",
            Auth::anonymous(),
            Duration::from_millis(200),
        )
        .unwrap();

        let handle = spawner.spawn_close_complaint(&client, "17".to_string());
        tokio::time::timeout(Duration::from_secs(30), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_result_is_reported_through_channel() {
        let (spawner, mut rx) = create_task_channel();
        let client = DeliveryClient::with_auth(
            "http://127.0.0.1:9",
            Auth::anonymous(),
            Duration::from_millis(200),
        )
        .unwrap();

        spawner.spawn_close_complaint(&client, "17".to_string());
        let message = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match message {
            ApiMessage::ComplaintClosed { id, result } => {
                assert_eq!(id, "17");
                assert!(result.is_err());
            }
            other => panic!("Expected ComplaintClosed, got {:?}", other),
        }
    }
}
