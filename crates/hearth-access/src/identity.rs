//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hearth_common::Clock;
use hearth_config::TokenConfig;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::actor::Actor;
use crate::capability::Role;
use crate::error::AccessError;
use crate::store::UserStore;

type HmacSha256 = Hmac<Sha256>;

/// Claims embedded in a signed bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user identifier.
    pub subject: String,
    /// Role at issuance time; the stored role is authoritative.
    pub role: Role,
    /// Issuance timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

fn mac_for(secret: &[u8], payload: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    mac
}

/// Issues signed bearer tokens.
///
/// The wire format is `base64url(claims json) "." base64url(hmac-sha256)`,
/// with the MAC computed over the encoded payload segment.
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    /// Build a signer from configuration.
    pub fn new(config: &TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            ttl: Duration::minutes(config.ttl_minutes),
            clock,
        }
    }

    /// Issue a token for a subject with the given role claim.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AccessError> {
        let now = self.clock.now();
        let claims = TokenClaims {
            subject: subject.to_owned(),
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let payload = B64.encode(
            serde_json::to_vec(&claims)
                .map_err(|err| AccessError::Store(format!("token serialization: {err}")))?,
        );
        let signature = B64.encode(mac_for(&self.secret, &payload).finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }
}

/// Turns a bearer credential into the current durable actor record.
///
/// Pure lookup: the resolver never mutates the identity store.
pub struct IdentityResolver {
    secret: Vec<u8>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl IdentityResolver {
    /// Build a resolver from configuration and an identity store.
    pub fn new(config: &TokenConfig, users: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            users,
            clock,
        }
    }

    /// Resolve a credential to an [`Actor`], or fail with a typed error.
    pub fn resolve(&self, credential: &str) -> Result<Actor, AccessError> {
        let (payload, signature) = credential
            .split_once('.')
            .ok_or_else(|| AccessError::InvalidCredential("malformed token".into()))?;

        let signature_bytes = B64
            .decode(signature)
            .map_err(|_| AccessError::InvalidCredential("malformed signature".into()))?;
        mac_for(&self.secret, payload)
            .verify_slice(&signature_bytes)
            .map_err(|_| AccessError::InvalidCredential("signature mismatch".into()))?;

        let payload_bytes = B64
            .decode(payload)
            .map_err(|_| AccessError::InvalidCredential("malformed payload".into()))?;
        let claims: TokenClaims = serde_json::from_slice(&payload_bytes)
            .map_err(|_| AccessError::InvalidCredential("malformed claims".into()))?;

        if self.clock.now() > claims.expires_at {
            return Err(AccessError::InvalidCredential("token expired".into()));
        }

        let user = self
            .users
            .user(&claims.subject)?
            .ok_or_else(|| AccessError::InvalidCredential("unknown subject".into()))?;
        if user.status != crate::actor::ActorStatus::Active {
            return Err(AccessError::AccountInactive);
        }
        if user.role != claims.role {
            // Tokens may be stale relative to role changes.
            debug!(
                subject = %user.id,
                claimed = %claims.role,
                stored = %user.role,
                "token role claim is stale; stored role wins"
            );
        }

        Ok(Actor::from_record(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorStatus, UserRecord};
    use crate::store::{MemoryUserStore, UserStore};
    use hearth_common::{FixedClock, RegionCode, SystemClock};

    fn config() -> TokenConfig {
        TokenConfig {
            secret: "unit-test-secret".into(),
            ttl_minutes: 30,
        }
    }

    fn store_with(record: UserRecord) -> Arc<MemoryUserStore> {
        let store = Arc::new(MemoryUserStore::default());
        store.upsert(record);
        store
    }

    #[test]
    fn issue_and_resolve_round_trip() {
        let clock = Arc::new(SystemClock);
        let store = store_with(UserRecord::new(
            "user-5",
            Role::PropertyManager,
            RegionCode::new("US"),
        ));
        let signer = TokenSigner::new(&config(), clock.clone());
        let resolver = IdentityResolver::new(&config(), store, clock);

        let token = signer.issue("user-5", Role::PropertyManager).unwrap();
        let actor = resolver.resolve(&token).unwrap();
        assert_eq!(actor.id, "user-5");
        assert_eq!(actor.role, Role::PropertyManager);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let clock = Arc::new(SystemClock);
        let store = store_with(UserRecord::new("user-5", Role::Tenant, RegionCode::new("US")));
        let signer = TokenSigner::new(&config(), clock.clone());
        let resolver = IdentityResolver::new(&config(), store, clock);

        let token = signer.issue("user-5", Role::Tenant).unwrap();
        let (payload, signature) = token.split_once('.').unwrap();
        let mut forged_payload = payload.to_owned();
        forged_payload.replace_range(0..1, if payload.starts_with('A') { "B" } else { "A" });
        let forged = format!("{forged_payload}.{signature}");
        assert!(matches!(
            resolver.resolve(&forged),
            Err(AccessError::InvalidCredential(_))
        ));

        assert!(matches!(
            resolver.resolve("not-a-token"),
            Err(AccessError::InvalidCredential(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let start = Utc::now();
        let clock = Arc::new(FixedClock::at(start));
        let store = store_with(UserRecord::new("user-5", Role::Tenant, RegionCode::new("US")));
        let signer = TokenSigner::new(&config(), clock.clone());
        let resolver = IdentityResolver::new(&config(), store, clock.clone());

        let token = signer.issue("user-5", Role::Tenant).unwrap();
        clock.set(start + Duration::minutes(31));
        assert!(matches!(
            resolver.resolve(&token),
            Err(AccessError::InvalidCredential(_))
        ));
    }

    #[test]
    fn suspended_accounts_fail_with_account_inactive() {
        let clock = Arc::new(SystemClock);
        let mut record = UserRecord::new("user-5", Role::Tenant, RegionCode::new("US"));
        record.status = ActorStatus::Suspended;
        let store = store_with(record);
        let signer = TokenSigner::new(&config(), clock.clone());
        let resolver = IdentityResolver::new(&config(), store, clock);

        let token = signer.issue("user-5", Role::Tenant).unwrap();
        assert!(matches!(
            resolver.resolve(&token),
            Err(AccessError::AccountInactive)
        ));
    }

    #[test]
    fn stale_role_claims_yield_the_stored_role() {
        let clock = Arc::new(SystemClock);
        let store = store_with(UserRecord::new(
            "user-5",
            Role::PropertyManager,
            RegionCode::new("US"),
        ));
        let signer = TokenSigner::new(&config(), clock.clone());
        let resolver = IdentityResolver::new(&config(), store.clone(), clock);

        // Token minted before a promotion: claim says tenant, store says manager.
        let token = signer.issue("user-5", Role::Tenant).unwrap();
        let actor = resolver.resolve(&token).unwrap();
        assert_eq!(actor.role, Role::PropertyManager);
        assert!(store.user("user-5").unwrap().is_some());
    }
}
