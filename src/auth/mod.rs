mod relay;

pub use relay::{AuthMessage, AuthPort, AuthRelay, AuthSession, Envelope};

/// The application's own origin; the relay accepts envelopes from this
/// origin only.
pub const APP_ORIGIN: &str = "trackdl://form";
