//! Routes and user-facing notifications
//!
//! The session controller and dashboard do not render anything themselves:
//! they move between [`Route`]s through a [`Navigator`] and report outcomes
//! through a [`Notifier`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Portal views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Login and registration form
    Alumni,
    /// Document dashboard
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Alumni => "/alumni",
            Route::Dashboard => "/alumni/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Notification style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

/// Transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

/// Moves the user between views
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Shows notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Navigator that remembers every route it was sent to
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    fn routes(&self) -> MutexGuard<'_, Vec<Route>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn history(&self) -> Vec<Route> {
        self.routes().clone()
    }

    pub fn current(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes().push(route);
    }
}

/// Notifier that keeps every notification it was given
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn notifications(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all(&self) -> Vec<Notification> {
        self.notifications().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications().push(notification);
    }
}
