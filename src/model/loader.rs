use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::ServiceError,
    model::{AppEnvelope, ModelDescriptor, ModelStore},
};

/// Remote collaborator that answers descriptor lookups.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn fetch(&self, app_id: &str) -> Result<AppEnvelope, ServiceError>;
}

/// Fetches descriptors over HTTP from `{base_url}/api/app/{id}/`.
pub struct HttpModelSource {
    client: Client,
    base_url: String,
}

impl HttpModelSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn full_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ModelSource for HttpModelSource {
    async fn fetch(&self, app_id: &str) -> Result<AppEnvelope, ServiceError> {
        let url = self.full_url(&format!("/api/app/{app_id}/"));
        debug!(%url, "requesting model descriptor");

        // Non-2xx bodies still carry a status field, so the HTTP status is not checked.
        let envelope = self.client.get(&url).send().await?.json().await?;
        Ok(envelope)
    }
}

/// What a single load attempt ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The descriptor was written to the store.
    Published,
    /// No identifier; nothing was requested.
    Skipped,
    /// The remote answered with a status other than `"OK"`.
    Rejected { status: serde_json::Value },
    /// The remote answered `"OK"` without a usable model payload.
    Malformed,
    /// The request itself failed.
    Failed,
    /// A newer load was issued before this one resolved.
    Superseded,
    /// The owner went away before the response could be committed.
    Cancelled,
}

pub struct Loader {
    source: Arc<dyn ModelSource>,
    store: ModelStore,
}

impl Loader {
    pub fn new(source: Arc<dyn ModelSource>, store: ModelStore) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Fetch the descriptor for `app_id` and publish it.
    ///
    /// Issues exactly one request for a non-empty id. Failures leave the store
    /// untouched and are reported only through the returned outcome.
    pub async fn load(&self, app_id: &str, cancel: &CancellationToken) -> LoadOutcome {
        if app_id.is_empty() {
            return LoadOutcome::Skipped;
        }

        let ticket = self.store.issue_ticket();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(app_id, "load cancelled while waiting for response");
                return LoadOutcome::Cancelled;
            }
            response = self.source.fetch(app_id) => response,
        };

        let envelope = match response {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(app_id, error = %err, "model descriptor request failed");
                return LoadOutcome::Failed;
            }
        };

        if !envelope.is_ok() {
            debug!(app_id, status = %envelope.status, "remote reported no model");
            return LoadOutcome::Rejected {
                status: envelope.status,
            };
        }

        let descriptor = match envelope.model.map(serde_json::from_value::<ModelDescriptor>) {
            Some(Ok(descriptor)) => descriptor,
            Some(Err(err)) => {
                warn!(app_id, error = %err, "model descriptor is malformed");
                return LoadOutcome::Malformed;
            }
            None => {
                warn!(app_id, "model descriptor missing from response");
                return LoadOutcome::Malformed;
            }
        };

        if cancel.is_cancelled() {
            return LoadOutcome::Cancelled;
        }

        if !self.store.set_if_latest(ticket, descriptor) {
            debug!(app_id, ticket, "newer load already issued, dropping response");
            return LoadOutcome::Superseded;
        }

        info!(app_id, "model descriptor published");
        LoadOutcome::Published
    }
}
