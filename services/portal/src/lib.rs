//! Alumni portal client
//!
//! Session and document access for the school's alumni portal: a token
//! store over a pluggable key-value store, a typed client for the REST
//! backend, the login/registration controller and the document dashboard.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod models;
pub mod navigation;
pub mod session;
pub mod token_store;
pub mod validation;

pub use api::ApiClient;
pub use config::PortalConfig;
pub use dashboard::{Dashboard, DocumentBuckets, DownloadOutcome, LoadOutcome};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use session::{FormMode, SessionController, SessionState, SubmitOutcome};
pub use token_store::TokenStore;
