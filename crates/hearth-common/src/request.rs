//! ---
//! hearth_section: "01-core-functionality"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Shared primitives for the Hearth access core."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Request-scoped metadata recorded alongside every audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Caller IP address as reported by the transport layer.
    pub ip: Option<String>,
    /// Caller user agent string.
    pub user_agent: Option<String>,
    /// Session identifier issued at login.
    pub session_id: Option<String>,
    /// Origin tag (`api`, `admin`, `system`).
    pub source: Option<String>,
}

impl RequestMeta {
    /// Metadata for actions originating inside the platform itself.
    pub fn system() -> Self {
        Self {
            source: Some("system".to_owned()),
            ..Self::default()
        }
    }

    /// Attach a caller IP.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Attach a user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Attach a session identifier.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session_id = Some(session.into());
        self
    }

    /// Attach an origin tag.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
