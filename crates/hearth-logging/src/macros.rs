//! ---
//! hearth_section: "03-persistence-logging"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Structured logging adapters and sinks."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
/// Emit an informational log enriched with Hearth request context.
#[macro_export]
macro_rules! hearth_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::INFO,
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with Hearth request context.
#[macro_export]
macro_rules! hearth_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::DEBUG,
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an error log enriched with Hearth request context.
#[macro_export]
macro_rules! hearth_error {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::ERROR,
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::ERROR,
            actor = ctx.actor.unwrap_or(""),
            resource = ctx.resource.unwrap_or(""),
            session = ctx.session.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}
