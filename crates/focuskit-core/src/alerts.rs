//! Best-effort notifications and sound on session completion.
//!
//! Nothing here can fail the caller. Sink errors are logged at `debug` and
//! dropped.

use std::cell::RefCell;
use std::io::Write;
use std::process::Command;
use std::rc::Rc;

use tracing::debug;

use crate::error::AlertError;
use crate::storage::{NotifyPermission, Settings};

/// A place alerts can be delivered to.
pub trait AlertSink {
    /// Ask whether notifications may be shown. Called at most once per
    /// unresolved permission; the answer is stored in [`Settings`].
    fn request_permission(&mut self) -> NotifyPermission;
    fn show(&mut self, title: &str, body: &str) -> Result<(), AlertError>;
    fn play_chime(&mut self) -> Result<(), AlertError>;
}

/// Desktop notifications through the platform helper, terminal bell for
/// the chime.
#[derive(Debug, Default)]
pub struct DesktopSink;

impl DesktopSink {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "linux")]
    fn helper_available() -> bool {
        Command::new("notify-send")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    #[cfg(target_os = "macos")]
    fn helper_available() -> bool {
        Command::new("osascript")
            .args(["-e", "return"])
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn helper_available() -> bool {
        false
    }
}

impl AlertSink for DesktopSink {
    fn request_permission(&mut self) -> NotifyPermission {
        if Self::helper_available() {
            NotifyPermission::Granted
        } else {
            NotifyPermission::Denied
        }
    }

    #[cfg(target_os = "linux")]
    fn show(&mut self, title: &str, body: &str) -> Result<(), AlertError> {
        let out = Command::new("notify-send")
            .args(["--app-name=focuskit", title, body])
            .output()?;
        if out.status.success() {
            Ok(())
        } else {
            Err(AlertError::HelperFailed(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ))
        }
    }

    #[cfg(target_os = "macos")]
    fn show(&mut self, title: &str, body: &str) -> Result<(), AlertError> {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            body.replace('"', r#"\""#).replace('\n', " "),
            title.replace('"', r#"\""#)
        );
        let out = Command::new("osascript").args(["-e", &script]).output()?;
        if out.status.success() {
            Ok(())
        } else {
            Err(AlertError::HelperFailed(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ))
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn show(&mut self, _title: &str, _body: &str) -> Result<(), AlertError> {
        Err(AlertError::Unsupported)
    }

    fn play_chime(&mut self) -> Result<(), AlertError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

/// What a [`RecordingSink`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    PermissionRequested,
    Shown { title: String, body: String },
    Chime,
}

/// Sink that remembers every call. Clones share the same log.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    answer: NotifyPermission,
    fail: bool,
    log: Rc<RefCell<Vec<Alert>>>,
}

impl RecordingSink {
    /// A sink that grants permission and always delivers.
    pub fn new() -> Self {
        Self::answering(NotifyPermission::Granted)
    }

    pub fn answering(answer: NotifyPermission) -> Self {
        Self {
            answer,
            fail: false,
            log: Rc::default(),
        }
    }

    /// Every delivery attempt errors after being logged.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.log.borrow().clone()
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|a| match a {
                Alert::Shown { title, body } => Some((title.clone(), body.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn chimes(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|a| matches!(a, Alert::Chime))
            .count()
    }

    fn outcome(&self) -> Result<(), AlertError> {
        if self.fail {
            Err(AlertError::HelperFailed("recording sink set to fail".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for RecordingSink {
    fn request_permission(&mut self) -> NotifyPermission {
        self.log.borrow_mut().push(Alert::PermissionRequested);
        self.answer
    }

    fn show(&mut self, title: &str, body: &str) -> Result<(), AlertError> {
        self.log.borrow_mut().push(Alert::Shown {
            title: title.to_string(),
            body: body.to_string(),
        });
        self.outcome()
    }

    fn play_chime(&mut self) -> Result<(), AlertError> {
        self.log.borrow_mut().push(Alert::Chime);
        self.outcome()
    }
}

/// Applies the user's toggles in front of a sink.
pub struct Alerts {
    sink: Box<dyn AlertSink>,
}

impl Alerts {
    pub fn new(sink: Box<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Show a notification if enabled and permitted. Resolves an unresolved
    /// permission first and records the answer in `settings`; returns `true`
    /// when `settings` changed and should be persisted.
    pub fn notify(&mut self, settings: &mut Settings, title: &str, body: &str) -> bool {
        if !settings.notify_on {
            return false;
        }
        let mut changed = false;
        if settings.notify_permission == NotifyPermission::Unresolved {
            settings.notify_permission = self.sink.request_permission();
            debug!(permission = ?settings.notify_permission, "notification permission resolved");
            changed = true;
        }
        if settings.notify_permission != NotifyPermission::Granted {
            return changed;
        }
        if let Err(e) = self.sink.show(title, body) {
            debug!(error = %e, "Failed to send desktop notification");
        }
        changed
    }

    pub fn beep(&mut self, settings: &Settings) {
        if !settings.sound_on {
            return;
        }
        if let Err(e) = self.sink.play_chime() {
            debug!(error = %e, "Failed to play chime");
        }
    }
}

impl Default for Alerts {
    fn default() -> Self {
        Self::new(Box::new(DesktopSink::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alerts(sink: &RecordingSink) -> Alerts {
        Alerts::new(Box::new(sink.clone()))
    }

    #[test]
    fn notify_requests_permission_once() {
        let sink = RecordingSink::new();
        let mut alerts = alerts(&sink);
        let mut settings = Settings::default();

        assert!(alerts.notify(&mut settings, "a", "b"));
        assert_eq!(settings.notify_permission, NotifyPermission::Granted);
        assert!(!alerts.notify(&mut settings, "c", "d"));

        let requests = sink
            .alerts()
            .into_iter()
            .filter(|a| *a == Alert::PermissionRequested)
            .count();
        assert_eq!(requests, 1);
        assert_eq!(sink.shown().len(), 2);
    }

    #[test]
    fn denied_permission_stays_silent() {
        let sink = RecordingSink::answering(NotifyPermission::Denied);
        let mut alerts = alerts(&sink);
        let mut settings = Settings::default();

        alerts.notify(&mut settings, "a", "b");
        alerts.notify(&mut settings, "a", "b");
        assert_eq!(settings.notify_permission, NotifyPermission::Denied);
        assert!(sink.shown().is_empty());
        assert_eq!(sink.alerts(), vec![Alert::PermissionRequested]);
    }

    #[test]
    fn toggles_disable_delivery() {
        let sink = RecordingSink::new();
        let mut alerts = alerts(&sink);
        let mut settings = Settings {
            notify_on: false,
            sound_on: false,
            ..Settings::default()
        };

        assert!(!alerts.notify(&mut settings, "a", "b"));
        alerts.beep(&settings);
        assert!(sink.alerts().is_empty());
        assert_eq!(settings.notify_permission, NotifyPermission::Unresolved);
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let sink = RecordingSink::new().failing();
        let mut alerts = alerts(&sink);
        let mut settings = Settings::default();

        alerts.notify(&mut settings, "a", "b");
        alerts.beep(&settings);
        assert_eq!(sink.shown().len(), 1);
        assert_eq!(sink.chimes(), 1);
    }
}
