//! Alumni document dashboard
//!
//! Requires a cached user, loads the document list once, sorts it into
//! sections and runs downloads. Downloads are tracked per document id, so
//! different documents can download at the same time while a second click
//! on a document that is already downloading is refused.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{ApiClient, save_download};
use crate::api::download::default_filename;
use crate::error::{ApiError, ApiResult};
use crate::models::{Document, DocumentCategory, UserProfile};
use crate::navigation::{Navigator, Notification, Notifier, Route};

/// Documents split into the three dashboard sections
#[derive(Debug, Default, PartialEq)]
pub struct DocumentBuckets<'a> {
    pub transcripts: Vec<&'a Document>,
    pub certificates: Vec<&'a Document>,
    pub other: Vec<&'a Document>,
}

impl<'a> DocumentBuckets<'a> {
    /// Put every document in exactly one section, keeping list order
    pub fn partition(documents: &'a [Document]) -> Self {
        let mut buckets = Self::default();
        for document in documents {
            match document.document_type.category() {
                DocumentCategory::Transcripts => buckets.transcripts.push(document),
                DocumentCategory::Certificates => buckets.certificates.push(document),
                DocumentCategory::Other => buckets.other.push(document),
            }
        }
        buckets
    }

    pub fn get(&self, category: DocumentCategory) -> &[&'a Document] {
        match category {
            DocumentCategory::Transcripts => &self.transcripts,
            DocumentCategory::Certificates => &self.certificates,
            DocumentCategory::Other => &self.other,
        }
    }

    pub fn len(&self) -> usize {
        self.transcripts.len() + self.certificates.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of mounting the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No session; the user was sent back to the login form
    Redirected,
    /// Documents loaded
    Loaded(usize),
    /// The list could not be fetched and stays empty
    Failed,
    Cancelled,
}

/// Result of a download request
#[derive(Debug)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    /// Fees are outstanding or the same document is already downloading
    Disabled,
    Failed(ApiError),
    Cancelled,
}

/// Removes a document id from the in-flight set when dropped
struct InFlight<'a> {
    set: &'a Mutex<HashSet<i64>>,
    document_id: i64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.document_id);
    }
}

/// Document dashboard for the signed-in alumnus
pub struct Dashboard {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    download_dir: PathBuf,
    user: Option<UserProfile>,
    documents: Vec<Document>,
    loading: bool,
    downloading: Mutex<HashSet<i64>>,
    cancel: CancellationToken,
}

impl Dashboard {
    pub fn new(
        api: ApiClient,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api,
            navigator,
            notifier,
            download_dir: download_dir.into(),
            user: None,
            documents: Vec::new(),
            loading: false,
            downloading: Mutex::new(HashSet::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn buckets(&self) -> DocumentBuckets<'_> {
        DocumentBuckets::partition(&self.documents)
    }

    /// Token that, once cancelled, stops every pending update of this dashboard
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop applying results of in-flight requests
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<i64>> {
        self.downloading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fee flags on the cached profile allow downloads
    pub fn can_download(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::can_download)
    }

    pub fn is_downloading(&self, document_id: i64) -> bool {
        self.in_flight().contains(&document_id)
    }

    pub fn is_download_disabled(&self, document_id: i64) -> bool {
        !self.can_download() || self.is_downloading(document_id)
    }

    /// Load the session user and fetch the document list once
    pub async fn mount(&mut self) -> LoadOutcome {
        let cancel = self.cancel.clone();
        if cancel.is_cancelled() {
            return LoadOutcome::Cancelled;
        }

        let user = self.api.tokens().get_user().unwrap_or_else(|e| {
            warn!("Could not read stored session: {}", e);
            None
        });
        let Some(user) = user else {
            info!("No session user, redirecting to login");
            self.navigator.navigate(Route::Alumni);
            return LoadOutcome::Redirected;
        };
        self.user = Some(user);
        self.loading = true;

        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.api.list_documents() => Some(result),
        };
        self.loading = false;
        let Some(result) = result else {
            info!("Document load abandoned: dashboard unmounted");
            return LoadOutcome::Cancelled;
        };

        match result {
            Ok(documents) => {
                info!("Loaded {} documents", documents.len());
                self.documents = documents;
                LoadOutcome::Loaded(self.documents.len())
            }
            Err(e) => {
                error!("Failed to load documents: {}", e);
                self.documents.clear();
                self.notifier
                    .notify(Notification::error("Failed to load documents", e.to_string()));
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch the profile again and refresh the cached copy
    pub async fn refresh_profile(&mut self) -> ApiResult<&UserProfile> {
        let cancel = self.cancel.clone();
        let profile = tokio::select! {
            _ = cancel.cancelled() => return Err(ApiError::RequestFailed("Dashboard closed".to_string())),
            profile = self.api.get_profile() => profile?,
        };
        self.api.tokens().set_user(&profile)?;
        Ok(self.user.insert(profile))
    }

    /// Download a document into the download directory
    pub async fn download(&self, document_id: i64) -> DownloadOutcome {
        if self.cancel.is_cancelled() {
            return DownloadOutcome::Cancelled;
        }
        if !self.can_download() {
            warn!("Download of {} blocked: fees outstanding", document_id);
            return DownloadOutcome::Disabled;
        }
        if !self.in_flight().insert(document_id) {
            warn!("Download of {} already in progress", document_id);
            return DownloadOutcome::Disabled;
        }
        let _guard = InFlight {
            set: &self.downloading,
            document_id,
        };

        let title = self
            .documents
            .iter()
            .find(|doc| doc.id == document_id)
            .map(|doc| doc.title.clone())
            .unwrap_or_else(|| default_filename(document_id));

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return DownloadOutcome::Cancelled,
            result = self.fetch_and_save(document_id) => result,
        };

        match result {
            Ok(path) => {
                self.notifier.notify(Notification::info(
                    "Download started",
                    format!("{} was saved to {}.", title, path.display()),
                ));
                DownloadOutcome::Saved(path)
            }
            Err(e) => {
                error!("Download of {} failed: {}", document_id, e);
                self.notifier
                    .notify(Notification::error("Download failed", e.to_string()));
                DownloadOutcome::Failed(e)
            }
        }
    }

    async fn fetch_and_save(&self, document_id: i64) -> ApiResult<PathBuf> {
        let download = self.api.download_document(document_id).await?;
        let dir = self.download_dir.clone();
        tokio::task::spawn_blocking(move || save_download(&download, &dir))
            .await
            .map_err(|e| ApiError::Io(std::io::Error::other(e)))?
    }

    /// End the session and go back to the login form
    pub fn logout(&mut self) -> ApiResult<()> {
        self.api.tokens().clear_tokens()?;
        self.user = None;
        self.documents.clear();
        self.navigator.navigate(Route::Alumni);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use chrono::Utc;

    fn doc(id: i64, kind: &str) -> Document {
        Document {
            id,
            title: format!("doc {}", id),
            document_type: DocumentType::from(kind.to_string()),
            file_url: None,
            uploaded_at: Utc::now(),
            is_verified: true,
            file_size: Some(1024),
        }
    }

    #[test]
    fn test_partition_puts_each_document_in_one_bucket() {
        let documents = vec![
            doc(1, "TRANSCRIPT"),
            doc(2, "CERTIFICATE"),
            doc(3, "DIPLOMA"),
            doc(4, "OTHER"),
        ];
        let buckets = DocumentBuckets::partition(&documents);

        let ids = |docs: &[&Document]| docs.iter().map(|d| d.id).collect::<Vec<_>>();
        assert_eq!(ids(&buckets.transcripts), vec![1]);
        assert_eq!(ids(&buckets.certificates), vec![2, 3]);
        assert_eq!(ids(&buckets.other), vec![4]);
        assert_eq!(buckets.len(), documents.len());
    }

    #[test]
    fn test_partition_of_nothing_is_empty() {
        let buckets = DocumentBuckets::partition(&[]);
        assert!(buckets.is_empty());
        for category in DocumentCategory::ALL {
            assert!(buckets.get(category).is_empty());
        }
    }
}
