//! Credential handshake with the secondary sign-in surface.
//!
//! The sign-in surface never touches the form directly: it posts typed
//! messages into a channel, each tagged with the origin its sender declares,
//! and the relay drops anything whose origin is not our own.

use futures::stream::BoxStream;
use futures::StreamExt;
use log::warn;
use tokio::sync::mpsc;

/// Message shapes accepted from the sign-in surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMessage {
    Success { cookies: String },
    Failed { message: Option<String> },
}

/// An inbound message together with the origin its sender declared.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub origin: String,
    pub message: AuthMessage,
}

/// Posting half, handed to whatever hosts the sign-in surface.
#[derive(Clone)]
pub struct AuthPort {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl AuthPort {
    pub fn post(&self, origin: impl Into<String>, message: AuthMessage) {
        // A closed receiver means the form is gone; nothing to deliver to.
        let _ = self.tx.send(Envelope {
            origin: origin.into(),
            message,
        });
    }
}

/// Receiving half. Converted into a stream exactly once, at startup; the
/// stream lives for the form's lifetime and dropping it is the unsubscribe.
pub struct AuthRelay {
    origin: String,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl AuthRelay {
    pub fn channel(origin: impl Into<String>) -> (AuthRelay, AuthPort) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            AuthRelay {
                origin: origin.into(),
                rx,
            },
            AuthPort { tx },
        )
    }

    /// Stream of accepted messages. Envelopes from any other origin are
    /// silently discarded.
    pub fn into_stream(self) -> BoxStream<'static, AuthMessage> {
        let origin = self.origin;
        futures::stream::unfold(self.rx, |mut rx| async move {
            rx.recv().await.map(|envelope| (envelope, rx))
        })
        .filter_map(move |envelope: Envelope| {
            let accepted = envelope.origin == origin;
            if !accepted {
                warn!(
                    "discarded auth message from foreign origin {:?}",
                    envelope.origin
                );
            }
            futures::future::ready(accepted.then_some(envelope.message))
        })
        .boxed()
    }
}

/// Outcome of the most recent handshake attempt plus the stored credential.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub credential: Option<String>,
    pub status_message: String,
    pub helper_open: bool,
}

impl AuthSession {
    /// Apply one accepted handshake message.
    pub fn apply(&mut self, message: AuthMessage) {
        match message {
            AuthMessage::Success { cookies } => {
                self.credential = Some(cookies);
                self.helper_open = false;
                self.status_message = "Signed in, cookies stored".to_string();
            }
            AuthMessage::Failed { message } => {
                // The surface stays open so the user may retry, but a failed
                // handshake invalidates whatever credential was stored.
                self.credential = None;
                self.status_message = message.unwrap_or_else(|| "Sign-in failed".to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        self.credential = None;
        self.status_message = "Cookies cleared".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWN_ORIGIN: &str = "trackdl://form";

    #[tokio::test]
    async fn foreign_origin_is_silently_discarded() {
        let (relay, port) = AuthRelay::channel(OWN_ORIGIN);
        let mut stream = relay.into_stream();

        port.post(
            "https://evil.example",
            AuthMessage::Success {
                cookies: "stolen=1".to_string(),
            },
        );
        port.post(
            OWN_ORIGIN,
            AuthMessage::Success {
                cookies: "Session_id=abc".to_string(),
            },
        );

        // Only the own-origin message comes through.
        let first = stream.next().await.unwrap();
        assert_eq!(
            first,
            AuthMessage::Success {
                cookies: "Session_id=abc".to_string()
            }
        );
    }

    #[tokio::test]
    async fn foreign_origin_does_not_alter_the_session() {
        let (relay, port) = AuthRelay::channel(OWN_ORIGIN);
        let mut stream = relay.into_stream();
        let mut session = AuthSession::default();

        port.post(
            "https://evil.example",
            AuthMessage::Success {
                cookies: "stolen=1".to_string(),
            },
        );
        drop(port);

        while let Some(message) = stream.next().await {
            session.apply(message);
        }
        assert_eq!(session.credential, None);
    }

    #[test]
    fn success_stores_the_credential_and_closes_the_surface() {
        let mut session = AuthSession {
            helper_open: true,
            ..AuthSession::default()
        };
        session.apply(AuthMessage::Success {
            cookies: "Session_id=abc".to_string(),
        });

        assert_eq!(session.credential.as_deref(), Some("Session_id=abc"));
        assert!(!session.helper_open);
        assert!(!session.status_message.is_empty());
    }

    #[test]
    fn failure_keeps_the_surface_open_and_clears_the_credential() {
        let mut session = AuthSession {
            credential: Some("old=1".to_string()),
            helper_open: true,
            ..AuthSession::default()
        };
        session.apply(AuthMessage::Failed {
            message: Some("expired".to_string()),
        });

        assert!(session.helper_open);
        assert_eq!(session.credential, None);
        assert_eq!(session.status_message, "expired");
    }

    #[test]
    fn failure_without_message_gets_a_default_status() {
        let mut session = AuthSession::default();
        session.apply(AuthMessage::Failed { message: None });
        assert_eq!(session.status_message, "Sign-in failed");
    }
}
