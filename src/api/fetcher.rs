use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::client::BookClient;
use crate::controller::{FetchOutcome, FetchRequest};

/// Runs searches on the async runtime and queues their outcomes for the
/// synchronous UI loop. Requests are never cancelled once spawned.
pub struct Fetcher {
    client: BookClient,
    runtime: Handle,
    tx: UnboundedSender<FetchOutcome>,
    rx: UnboundedReceiver<FetchOutcome>,
}

impl Fetcher {
    pub fn new(client: BookClient, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            runtime,
            tx,
            rx,
        }
    }

    pub fn client(&self) -> &BookClient {
        &self.client
    }

    pub fn dispatch(&self, request: FetchRequest) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.search(&request.state).await;
            if tx
                .send(FetchOutcome {
                    seq: request.seq,
                    result,
                })
                .is_err()
            {
                debug!(seq = request.seq, "receiver dropped; search outcome discarded");
            }
        });
    }

    /// Next finished search, if any, without blocking.
    pub fn try_next(&mut self) -> Option<FetchOutcome> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished search.
    pub async fn next(&mut self) -> Option<FetchOutcome> {
        self.rx.recv().await
    }
}
