//! Client side of the school's REST backend

pub mod client;
pub mod download;
pub mod error_body;

pub use client::ApiClient;
pub use download::{DocumentDownload, save_download};
