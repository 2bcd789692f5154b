pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod server;
pub mod view;
pub mod widgets;

pub use catalog::AppCatalog;
pub use config::AppConfig;
pub use dispatch::{OutputType, WidgetKind, dispatch};
pub use model::{HttpModelSource, LoadOutcome, Loader, ModelDescriptor, ModelSource, ModelStore};
pub use server::build_router;
pub use view::{ExecuteView, Rendered, ViewPhase};
