use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    dispatch::{WidgetKind, dispatch_descriptor},
    model::{ActiveModel, LoadOutcome, Loader, ModelDescriptor, ModelStore},
};

pub const INVALID_APPLICATION_NOTICE: &str = "Invalid application";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// No application id was supplied. Terminal.
    Invalid,
    Loading,
    /// A descriptor is available. Before the load resolves this may be one
    /// left by an earlier load.
    Ready,
    /// The load finished without publishing its descriptor.
    ReadyEmpty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    InvalidApplication,
    Nothing,
    Widget {
        kind: WidgetKind,
        model: Arc<ModelDescriptor>,
    },
}

impl Rendered {
    pub fn to_html(&self) -> String {
        match self {
            Rendered::InvalidApplication => format!("<p>{INVALID_APPLICATION_NOTICE}</p>"),
            Rendered::Nothing => String::new(),
            Rendered::Widget { kind, model } => kind.render(model),
        }
    }
}

/// One mounted instance of the execute view: loads the descriptor for one
/// application id and renders whichever widget its output type selects.
///
/// The load is triggered once, at mount, for the id given then. Dropping the
/// view cancels a load that has not committed yet.
pub struct ExecuteView {
    app_id: Option<String>,
    active: watch::Receiver<ActiveModel>,
    cancel: CancellationToken,
    load: Option<JoinHandle<LoadOutcome>>,
    outcome: Option<LoadOutcome>,
}

impl ExecuteView {
    /// Mount the view. Must be called from within a Tokio runtime when
    /// `app_id` is present.
    pub fn mount(app_id: Option<String>, store: &ModelStore, loader: Arc<Loader>) -> Self {
        let app_id = app_id.filter(|id| !id.is_empty());
        let cancel = CancellationToken::new();

        let load = app_id.clone().map(|id| {
            let token = cancel.child_token();
            debug!(app_id = %id, "mounting execute view");
            tokio::spawn(async move { loader.load(&id, &token).await })
        });

        Self {
            app_id,
            active: store.subscribe(),
            cancel,
            load,
            outcome: None,
        }
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn phase(&self) -> ViewPhase {
        if self.app_id.is_none() {
            return ViewPhase::Invalid;
        }
        match (&self.outcome, self.visible_model()) {
            (_, Some(_)) => ViewPhase::Ready,
            (None, None) => ViewPhase::Loading,
            (Some(_), None) => ViewPhase::ReadyEmpty,
        }
    }

    pub fn render(&self) -> Rendered {
        if self.app_id.is_none() {
            return Rendered::InvalidApplication;
        }
        let Some(model) = self.visible_model() else {
            return Rendered::Nothing;
        };
        match dispatch_descriptor(&model) {
            Some(kind) => Rendered::Widget { kind, model },
            None => {
                debug!(output_type = ?model.output_type(), "no widget for output type");
                Rendered::Nothing
            }
        }
    }

    /// The stored descriptor, unless this view's load resolved without
    /// publishing. A failed or superseded load never shows what another load
    /// left in the store.
    fn visible_model(&self) -> ActiveModel {
        match self.outcome {
            None | Some(LoadOutcome::Published) => self.active.borrow().clone(),
            Some(_) => None,
        }
    }

    /// Wait for the mount-time load to finish and return how it ended.
    /// `None` for an invalid view.
    pub async fn settle(&mut self) -> Option<LoadOutcome> {
        if let Some(handle) = self.load.take() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(error = %err, "model load task failed");
                    LoadOutcome::Failed
                }
            };
            self.outcome = Some(outcome);
        }
        self.outcome.clone()
    }

    /// Wait until the store publishes a different descriptor, then render.
    /// Returns the current rendering if the store has been dropped.
    pub async fn changed(&mut self) -> Rendered {
        if self.active.changed().await.is_err() {
            debug!("model store closed");
        }
        self.render()
    }

    /// Cancel a load that has not committed yet and release the view.
    pub fn unmount(self) {
        self.cancel.cancel();
    }
}

impl Drop for ExecuteView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
