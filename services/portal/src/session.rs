//! Login and registration form controller
//!
//! State machine: `Anonymous -> Submitting -> Authenticated`, or back to
//! `Anonymous` carrying the error on failure. Form fields survive failures.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, RegistrationRequest, UserProfile};
use crate::navigation::{Navigator, Notification, Notifier, Route};
use crate::validation;

/// Which form is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Register,
}

/// Login form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Controller state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous { error: Option<String> },
    Submitting,
    Authenticated(UserProfile),
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Anonymous { error: None }
    }
}

/// Result of a form submission
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Session stored and dashboard opened
    Authenticated(UserProfile),
    /// Account created but no tokens issued until an administrator approves it
    PendingApproval,
    Failed(ApiError),
    /// The controller was unmounted while the request was in flight
    Cancelled,
}

/// Drives the alumni login/registration form
pub struct SessionController {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    redirect_delay: Duration,
    mode: FormMode,
    login: LoginForm,
    registration: RegistrationRequest,
    state: SessionState,
    cancel: CancellationToken,
}

impl SessionController {
    pub fn new(
        api: ApiClient,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            api,
            navigator,
            notifier,
            redirect_delay,
            mode: FormMode::default(),
            login: LoginForm::default(),
            registration: RegistrationRequest::default(),
            state: SessionState::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FormMode) {
        self.mode = mode;
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    pub fn login_form_mut(&mut self) -> &mut LoginForm {
        &mut self.login
    }

    pub fn registration_form(&self) -> &RegistrationRequest {
        &self.registration
    }

    pub fn registration_form_mut(&mut self) -> &mut RegistrationRequest {
        &mut self.registration
    }

    /// Signed-in user, once authenticated
    pub fn user(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The form is disabled while a submission is in flight
    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Submitting
    }

    /// Token that, once cancelled, stops every pending update of this controller
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop applying results of in-flight requests
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    /// Skip the form when a session was restored from the token store
    ///
    /// Returns true when the user was sent to the dashboard.
    pub fn mount(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        match self.api.tokens().get_user() {
            Ok(Some(user)) => {
                info!("Restored session for user: {}", user.username);
                self.state = SessionState::Authenticated(user);
                self.navigator.navigate(Route::Dashboard);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read stored session: {}", e);
                false
            }
        }
    }

    async fn perform(&self, mode: FormMode) -> ApiResult<AuthResponse> {
        match mode {
            FormMode::Login => {
                validation::validate_login(&self.login.username, &self.login.password)
                    .map_err(ApiError::Validation)?;
                self.api
                    .login(self.login.username.trim(), &self.login.password)
                    .await
            }
            FormMode::Register => {
                validation::validate_registration(&self.registration)
                    .map_err(ApiError::Validation)?;
                self.api.register(&self.registration).await
            }
        }
    }

    /// Submit the current form
    pub async fn submit(&mut self) -> SubmitOutcome {
        let cancel = self.cancel.clone();
        if cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }

        let mode = self.mode;
        self.state = SessionState::Submitting;

        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.perform(mode) => Some(result),
        };
        let Some(result) = result else {
            info!("Submission abandoned: controller unmounted");
            self.state = SessionState::default();
            return SubmitOutcome::Cancelled;
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => return self.fail(mode, e),
        };

        let established = match self.api.tokens().apply_auth(&response) {
            Ok(established) => established,
            Err(e) => return self.fail(mode, e.into()),
        };

        if !established {
            return match mode {
                FormMode::Register => {
                    info!(
                        "Registration for {} pending approval",
                        response.user.username
                    );
                    self.state = SessionState::Anonymous { error: None };
                    self.notifier.notify(Notification::info(
                        "Registration Submitted",
                        "Your registration has been submitted for admin approval.",
                    ));
                    SubmitOutcome::PendingApproval
                }
                FormMode::Login => self.fail(
                    mode,
                    ApiError::RequestFailed("Login response did not include tokens".to_string()),
                ),
            };
        }

        let user = response.user;
        info!("User authenticated: {}", user.username);
        self.state = SessionState::Authenticated(user.clone());
        self.notifier.notify(match mode {
            FormMode::Login => Notification::info(
                "Login Successful",
                "Welcome back! Your alumni dashboard is loading...",
            ),
            FormMode::Register => Notification::info(
                "Registration Successful",
                "Welcome! Your alumni dashboard is loading...",
            ),
        });

        tokio::select! {
            _ = cancel.cancelled() => return SubmitOutcome::Cancelled,
            _ = tokio::time::sleep(self.redirect_delay) => {}
        }
        self.navigator.navigate(Route::Dashboard);

        SubmitOutcome::Authenticated(user)
    }

    fn fail(&mut self, mode: FormMode, error: ApiError) -> SubmitOutcome {
        warn!("{:?} failed: {}", mode, error);
        let message = error.to_string();
        self.notifier.notify(Notification::error(
            match mode {
                FormMode::Login => "Login Failed",
                FormMode::Register => "Registration Failed",
            },
            message.clone(),
        ));
        self.state = SessionState::Anonymous {
            error: Some(message),
        };
        SubmitOutcome::Failed(error)
    }
}
