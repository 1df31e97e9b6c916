//! ---
//! hearth_section: "03-persistence-logging"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Structured logging adapters and sinks."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
#![warn(missing_docs)]

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Actor identifier associated with the log event.
    pub actor: Option<&'a str>,
    /// Resource identifier (`property:12`, `ticket:88`) touched by the event.
    pub resource: Option<&'a str>,
    /// Session identifier of the originating request.
    pub session: Option<&'a str>,
    /// Origin of the event (`api`, `admin`, `system`).
    pub source: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an actor identifier.
    pub fn with_actor(mut self, actor: &'a str) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Attach a resource identifier.
    pub fn with_resource(mut self, resource: &'a str) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Attach a session identifier.
    pub fn with_session(mut self, session: &'a str) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach an origin descriptor.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }
}

/// High-level outcome used when emitting access-decision log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEventOutcome {
    /// The request was allowed.
    Allowed,
    /// The request was denied.
    Denied,
    /// The operation itself failed (storage, serialization).
    Fault,
}

impl AccessEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            AccessEventOutcome::Allowed => "allowed",
            AccessEventOutcome::Denied => "denied",
            AccessEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized access event with an allowed/denied/fault outcome.
pub fn log_access_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: AccessEventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    match outcome {
        AccessEventOutcome::Allowed => tracing::info!(
            event,
            outcome = outcome.as_str(),
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %message
        ),
        AccessEventOutcome::Denied => tracing::warn!(
            event,
            outcome = outcome.as_str(),
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %message
        ),
        AccessEventOutcome::Fault => tracing::error!(
            event,
            outcome = outcome.as_str(),
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new().with_actor("user-1").with_resource("property:12");
        hearth_info!(context = ctx.clone(), "capability granted");
        hearth_debug!("debug message");
        hearth_error!(context = ctx, "error code: {}", 42);
    }

    #[test]
    fn init_does_not_panic() {
        init();
    }

    #[test]
    fn access_event_helper_emits() {
        init();
        let ctx = LogContext::new().with_actor("user-1");
        log_access_event(
            Some(&ctx),
            "authorize.decision",
            "capability check passed",
            AccessEventOutcome::Allowed,
        );
        log_access_event(
            None,
            "authorize.decision",
            "no covering delegation",
            AccessEventOutcome::Denied,
        );
        log_access_event(None, "audit.append", "storage unavailable", AccessEventOutcome::Fault);
    }
}
