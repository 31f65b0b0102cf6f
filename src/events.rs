//! Wallet home-screen events
//!
//! The five lifecycle notifications a wallet front end broadcasts to its home
//! screen, as a closed enum. Incoming action strings are parsed once, and
//! dispatch is an exhaustive match so every variant reaches exactly one
//! handler method.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ACTION_DOWNLOAD_READY: &str = "DOWNLOAD_READY";
pub const ACTION_RESET_TOOLBAR: &str = "RESET_TOOLBAR";
pub const ACTION_REQUEST_NOTIFICATION_ACCESS: &str = "REQUEST_NOTIFICATION_ACCESS";
pub const ACTION_BACKUP_WALLET_SUCCESS: &str = "BACKUP_WALLET_SUCCESS";
pub const ACTION_CHANGE_CURRENCY: &str = "CHANGE_CURRENCY";

/// Extra carrying the new app version for `DOWNLOAD_READY`
pub const EXTRA_VERSION: &str = "Version";
/// Extra carrying the key address for `BACKUP_WALLET_SUCCESS`
pub const EXTRA_KEY: &str = "Key";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action {action} is missing extra {extra}")]
    MissingExtra {
        action: &'static str,
        extra: &'static str,
    },
}

/// A home-screen lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HomeEvent {
    /// A new app version finished downloading
    DownloadReady { version: String },
    /// The toolbar should return to its default state
    ResetToolbar,
    /// Ask the user for notification access
    RequestNotificationAccess,
    /// A wallet key was backed up
    #[serde(rename_all = "camelCase")]
    BackupSuccess { key_address: String },
    /// The display currency changed
    ChangeCurrency,
}

/// Receiver of home-screen notifications
pub trait HomeHandler {
    fn download_ready(&mut self, version: &str);
    fn reset_toolbar(&mut self);
    fn request_notification_permission(&mut self);
    fn backup_success(&mut self, key_address: &str);
    fn change_currency(&mut self);
}

impl HomeEvent {
    /// Parse an action identifier and its extras
    pub fn from_action(action: &str, extras: &HashMap<String, String>) -> Result<Self, EventError> {
        let extra = |action: &'static str, extra: &'static str| {
            extras
                .get(extra)
                .cloned()
                .ok_or(EventError::MissingExtra { action, extra })
        };

        match action {
            ACTION_DOWNLOAD_READY => Ok(HomeEvent::DownloadReady {
                version: extra(ACTION_DOWNLOAD_READY, EXTRA_VERSION)?,
            }),
            ACTION_RESET_TOOLBAR => Ok(HomeEvent::ResetToolbar),
            ACTION_REQUEST_NOTIFICATION_ACCESS => Ok(HomeEvent::RequestNotificationAccess),
            ACTION_BACKUP_WALLET_SUCCESS => Ok(HomeEvent::BackupSuccess {
                key_address: extra(ACTION_BACKUP_WALLET_SUCCESS, EXTRA_KEY)?,
            }),
            ACTION_CHANGE_CURRENCY => Ok(HomeEvent::ChangeCurrency),
            other => Err(EventError::UnknownAction(other.to_string())),
        }
    }

    /// Action identifier for this event
    pub fn action(&self) -> &'static str {
        match self {
            HomeEvent::DownloadReady { .. } => ACTION_DOWNLOAD_READY,
            HomeEvent::ResetToolbar => ACTION_RESET_TOOLBAR,
            HomeEvent::RequestNotificationAccess => ACTION_REQUEST_NOTIFICATION_ACCESS,
            HomeEvent::BackupSuccess { .. } => ACTION_BACKUP_WALLET_SUCCESS,
            HomeEvent::ChangeCurrency => ACTION_CHANGE_CURRENCY,
        }
    }

    /// Deliver this event to a handler
    pub fn dispatch<H: HomeHandler + ?Sized>(&self, handler: &mut H) {
        debug!(action = self.action(), "Dispatching home event");
        match self {
            HomeEvent::DownloadReady { version } => handler.download_ready(version),
            HomeEvent::ResetToolbar => handler.reset_toolbar(),
            HomeEvent::RequestNotificationAccess => handler.request_notification_permission(),
            HomeEvent::BackupSuccess { key_address } => handler.backup_success(key_address),
            HomeEvent::ChangeCurrency => handler.change_currency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl HomeHandler for Recorder {
        fn download_ready(&mut self, version: &str) {
            self.calls.push(format!("download_ready:{}", version));
        }
        fn reset_toolbar(&mut self) {
            self.calls.push("reset_toolbar".to_string());
        }
        fn request_notification_permission(&mut self) {
            self.calls.push("request_notification_permission".to_string());
        }
        fn backup_success(&mut self, key_address: &str) {
            self.calls.push(format!("backup_success:{}", key_address));
        }
        fn change_currency(&mut self) {
            self.calls.push("change_currency".to_string());
        }
    }

    fn extras(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_each_action_reaches_one_handler() {
        let cases = [
            (ACTION_DOWNLOAD_READY, extras(&[("Version", "3.2.1")]), "download_ready:3.2.1"),
            (ACTION_RESET_TOOLBAR, extras(&[]), "reset_toolbar"),
            (ACTION_REQUEST_NOTIFICATION_ACCESS, extras(&[]), "request_notification_permission"),
            (ACTION_BACKUP_WALLET_SUCCESS, extras(&[("Key", "0xabc")]), "backup_success:0xabc"),
            (ACTION_CHANGE_CURRENCY, extras(&[]), "change_currency"),
        ];

        for (action, extras, expected) in cases {
            let event = HomeEvent::from_action(action, &extras).unwrap();
            assert_eq!(event.action(), action);

            let mut recorder = Recorder::default();
            event.dispatch(&mut recorder);
            assert_eq!(recorder.calls, vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_unknown_action_is_error() {
        assert_eq!(
            HomeEvent::from_action("SOMETHING_ELSE", &HashMap::new()),
            Err(EventError::UnknownAction("SOMETHING_ELSE".to_string()))
        );
    }

    #[test]
    fn test_missing_extra_is_error() {
        assert_eq!(
            HomeEvent::from_action(ACTION_BACKUP_WALLET_SUCCESS, &HashMap::new()),
            Err(EventError::MissingExtra {
                action: ACTION_BACKUP_WALLET_SUCCESS,
                extra: EXTRA_KEY,
            })
        );
    }

    #[test]
    fn test_event_json() {
        let event = HomeEvent::BackupSuccess {
            key_address: "0xabc".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"backupSuccess","keyAddress":"0xabc"}"#);

        let parsed: HomeEvent = serde_json::from_str(r#"{"type":"changeCurrency"}"#).unwrap();
        assert_eq!(parsed, HomeEvent::ChangeCurrency);
    }
}
