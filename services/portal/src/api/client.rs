//! HTTP client for the school backend

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::api::download::{DocumentDownload, filename_from_content_disposition};
use crate::api::error_body::parse_error_response;
use crate::config::PortalConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthResponse, Document, Fee, Listing, LoginRequest, ProfileUpdate, RegistrationRequest, Role,
    UserProfile,
};
use crate::token_store::TokenStore;

/// Client for the portal's REST backend
///
/// Reads the access token from the [`TokenStore`] for authenticated calls but
/// never writes to it; applying a login or registration to the session is the
/// caller's job (see [`TokenStore::apply_auth`]).
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &PortalConfig, tokens: TokenStore) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        info!("API client targeting {}", config.api_url);
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Token store this client reads from
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the access token on the blocking pool
    ///
    /// Store backends may do network or file I/O (Redis, the session file),
    /// which must not run on an async worker.
    async fn stored_token(&self) -> ApiResult<Option<String>> {
        let tokens = self.tokens.clone();
        let token = tokio::task::spawn_blocking(move || tokens.get_token())
            .await
            .map_err(|e| ApiError::Io(std::io::Error::other(e)))??;
        Ok(token)
    }

    /// Access token or [`ApiError::Unauthenticated`], before anything is sent
    async fn require_token(&self) -> ApiResult<String> {
        self.stored_token().await?.ok_or(ApiError::Unauthenticated)
    }

    /// Attach `Bearer <token>`, or an empty header when signed out
    async fn optional_auth(&self, request: RequestBuilder) -> ApiResult<RequestBuilder> {
        let value = match self.stored_token().await? {
            Some(token) => format!("Bearer {}", token),
            None => String::new(),
        };
        Ok(request.header(header::AUTHORIZATION, value))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        request.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            ApiError::Transport(e)
        })
    }

    /// Decode a JSON body, reducing any non-2xx to `failure`
    async fn json_or<T: DeserializeOwned>(response: Response, failure: &str) -> ApiResult<T> {
        if !response.status().is_success() {
            error!("{}: {}", failure, response.status());
            return Err(ApiError::RequestFailed(failure.to_string()));
        }
        Ok(response.json().await?)
    }

    /// Decode a JSON body, parsing structured errors out of non-2xx bodies
    async fn json_or_parsed<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let err = parse_error_response(response).await;
            error!("Request rejected with {}: {}", status, err);
            return Err(err);
        }
        Ok(response.json().await?)
    }

    /// Register a new account; the role defaults to `ALUMNI`
    pub async fn register(&self, fields: &RegistrationRequest) -> ApiResult<AuthResponse> {
        info!("Registration attempt for user: {}", fields.username);

        let mut body = fields.clone();
        body.role.get_or_insert(Role::Alumni);

        let response = self
            .send(self.http.post(self.url("/auth/register/")).json(&body))
            .await?;
        Self::json_or_parsed(response).await
    }

    /// Log in with username and password
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        info!("Login attempt for user: {}", username);

        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .send(self.http.post(self.url("/auth/login/")).json(&body))
            .await?;
        Self::json_or_parsed(response).await
    }

    /// Fetch the signed-in user's profile
    pub async fn get_profile(&self) -> ApiResult<UserProfile> {
        let token = self.require_token().await?;
        let response = self
            .send(self.http.get(self.url("/auth/profile/")).bearer_auth(token))
            .await?;
        Self::json_or(response, "Failed to get profile").await
    }

    /// Update profile fields of the signed-in user
    pub async fn update_profile(&self, changes: &ProfileUpdate) -> ApiResult<UserProfile> {
        let token = self.require_token().await?;
        let response = self
            .send(
                self.http
                    .patch(self.url("/auth/profile/update/"))
                    .bearer_auth(token)
                    .json(changes),
            )
            .await?;
        Self::json_or_parsed(response).await
    }

    /// List the signed-in user's documents
    pub async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        let token = self.require_token().await?;
        let response = self
            .send(self.http.get(self.url("/documents/")).bearer_auth(token))
            .await?;
        let listing: Listing<Document> = Self::json_or(response, "Failed to get documents").await?;
        Ok(listing.into_vec())
    }

    /// Download a document's file
    ///
    /// A 403 means the account still owes fees.
    pub async fn download_document(&self, document_id: i64) -> ApiResult<DocumentDownload> {
        let token = self.require_token().await?;
        info!("Downloading document: {}", document_id);

        let response = self
            .send(
                self.http
                    .get(self.url(&format!("/documents/{}/download/", document_id)))
                    .bearer_auth(token),
            )
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::FORBIDDEN => {
                error!("Download of document {} refused: fees outstanding", document_id);
                return Err(ApiError::FeesOutstanding);
            }
            status => {
                error!("Download of document {} failed: {}", document_id, status);
                return Err(ApiError::RequestFailed(
                    "Failed to download document".to_string(),
                ));
            }
        }

        let headers = response.headers();
        let filename = filename_from_content_disposition(
            headers
                .get(header::CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok()),
            document_id,
        );
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(DocumentDownload {
            document_id,
            filename,
            content_type,
            bytes,
        })
    }

    /// List the signed-in user's fees
    pub async fn list_fees(&self) -> ApiResult<Vec<Fee>> {
        let token = self.require_token().await?;
        let response = self
            .send(self.http.get(self.url("/fees/")).bearer_auth(token))
            .await?;
        let listing: Listing<Fee> = Self::json_or(response, "Failed to get fees").await?;
        Ok(listing.into_vec())
    }

    /// Check whether a student has been cleared by the school office
    pub async fn check_clearance(&self, student_id: &str) -> ApiResult<Value> {
        let request = self
            .http
            .get(self.url(&format!("/alumni/status/{}/", student_id)));
        let response = self.send(self.optional_auth(request).await?).await?;
        Self::json_or(response, "Failed to check status").await
    }

    /// Ask the school office for an official transcript
    pub async fn request_transcript(&self, student_id: &str) -> ApiResult<Value> {
        info!("Requesting transcript for student: {}", student_id);
        let request = self
            .http
            .post(self.url("/alumni/request-transcript/"))
            .json(&json!({ "studentId": student_id }));
        let response = self.send(self.optional_auth(request).await?).await?;
        Self::json_or(response, "Failed to request transcript").await
    }
}
