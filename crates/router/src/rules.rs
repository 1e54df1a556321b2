//! The guard as an ordered strategy table.
//!
//! Each [`GuardRule`] pairs a predicate over the target route with a handler.
//! Rules run in table order; the first handler that decides wins, and a
//! destination no rule decides on proceeds.
//!
//! Realm precedence lives in [`default_rules`]: channel partner, instructor,
//! institution administrator, then learner. A realm gate that applies always
//! decides, which makes realm requirements mutually exclusive per request.

use std::sync::Arc;

use async_trait::async_trait;

use campusgate_auth::{AdminTier, CredentialCodec, SessionRegistry, SessionStore};
use campusgate_core::{Realm, SCHOOL_ADMIN_HOME};

use crate::engine::Decision;
use crate::error::GuardError;
use crate::forced_action::ForcedActionRegistry;
use crate::generation::Ticket;
use crate::route::{ResolvedRoute, RouteKind};

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Decide(Decision),
    /// Defer to the next rule.
    Continue,
}

/// Everything a rule may consult while deciding one navigation.
pub struct GuardContext<'a> {
    pub route: &'a ResolvedRoute,
    pub sessions: &'a SessionRegistry,
    pub codec: &'a CredentialCodec,
    pub forced_actions: &'a ForcedActionRegistry,
    pub ticket: &'a Ticket,
}

impl GuardContext<'_> {
    pub fn store(&self, realm: Realm) -> &Arc<SessionStore> {
        self.sessions.store(realm)
    }

    /// The realm's access credential, if present and not expired.
    pub fn valid_credential(&self, realm: Realm) -> Option<String> {
        self.store(realm)
            .current_access_credential()
            .filter(|credential| !self.codec.is_expired(credential))
    }

    /// Fails with [`GuardError::Superseded`] once a newer navigation started.
    /// Rules call this before mutating session state.
    pub fn ensure_current(&self) -> Result<(), GuardError> {
        if self.ticket.is_current() {
            Ok(())
        } else {
            Err(GuardError::Superseded)
        }
    }

    /// Clear `realm` and send the user to its login page.
    pub fn deny(&self, realm: Realm) -> Result<Verdict, GuardError> {
        self.ensure_current()?;
        tracing::info!(realm = %realm, path = %self.route.path, "session invalid; redirecting to login");
        self.store(realm).clear();
        Ok(redirect(realm.login_path()))
    }

    /// Administrator home appropriate to the persisted role.
    pub fn admin_home(&self) -> &'static str {
        let role = self
            .store(Realm::InstitutionAdmin)
            .resolve_principal()
            .and_then(|principal| principal.role());

        match AdminTier::of(role.as_ref()) {
            AdminTier::School => SCHOOL_ADMIN_HOME,
            AdminTier::Platform => Realm::InstitutionAdmin.home_path(),
        }
    }

    pub fn home_for(&self, realm: Realm) -> &'static str {
        match realm {
            Realm::InstitutionAdmin => self.admin_home(),
            other => other.home_path(),
        }
    }
}

fn redirect(path: &str) -> Verdict {
    Verdict::Decide(Decision::RedirectTo(path.to_string()))
}

#[async_trait]
pub trait GuardRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies(&self, route: &ResolvedRoute) -> bool;

    async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<Verdict, GuardError>;
}

/// Run `rules` in order against `ctx.route`.
pub async fn evaluate(rules: &[Arc<dyn GuardRule>], ctx: &GuardContext<'_>) -> Result<Decision, GuardError> {
    for rule in rules {
        if !rule.applies(ctx.route) {
            continue;
        }
        match rule.evaluate(ctx).await? {
            Verdict::Decide(decision) => {
                tracing::debug!(rule = rule.name(), ?decision, "rule decided");
                return Ok(decision);
            }
            Verdict::Continue => {
                tracing::trace!(rule = rule.name(), "rule deferred");
            }
        }
    }
    Ok(Decision::Proceed)
}

/// Exclusive gate for a privileged realm (channel partner, instructor,
/// institution administrator).
#[derive(Debug, Clone, Copy)]
pub struct RealmGate {
    realm: Realm,
}

impl RealmGate {
    pub fn new(realm: Realm) -> Self {
        Self { realm }
    }
}

#[async_trait]
impl GuardRule for RealmGate {
    fn name(&self) -> &'static str {
        match self.realm {
            Realm::ChannelPartner => "channel_gate",
            Realm::Instructor => "instructor_gate",
            Realm::InstitutionAdmin => "admin_gate",
            Realm::Learner => "learner_realm_gate",
        }
    }

    fn applies(&self, route: &ResolvedRoute) -> bool {
        route.flags().requires(self.realm)
    }

    async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<Verdict, GuardError> {
        if ctx.valid_credential(self.realm).is_none() {
            return ctx.deny(self.realm);
        }

        // Administrators land on a role-specific home.
        if self.realm == Realm::InstitutionAdmin
            && matches!(
                ctx.route.kind(),
                RouteKind::Home(Realm::InstitutionAdmin) | RouteKind::Login(Realm::InstitutionAdmin)
            )
        {
            let home = ctx.admin_home();
            if ctx.route.path != home {
                return Ok(redirect(home));
            }
        }

        Ok(Verdict::Decide(Decision::Proceed))
    }
}

/// Send an already authenticated user away from their realm's login page.
#[derive(Debug, Clone, Copy)]
pub struct LoginRedirect {
    realm: Realm,
}

impl LoginRedirect {
    pub fn new(realm: Realm) -> Self {
        Self { realm }
    }
}

#[async_trait]
impl GuardRule for LoginRedirect {
    fn name(&self) -> &'static str {
        match self.realm {
            Realm::ChannelPartner => "channel_login",
            Realm::Instructor => "instructor_login",
            Realm::InstitutionAdmin => "admin_login",
            Realm::Learner => "learner_login",
        }
    }

    fn applies(&self, route: &ResolvedRoute) -> bool {
        route.kind() == RouteKind::Login(self.realm)
    }

    async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<Verdict, GuardError> {
        match ctx.valid_credential(self.realm) {
            Some(_) => Ok(redirect(ctx.home_for(self.realm))),
            None => Ok(Verdict::Continue),
        }
    }
}

/// Default-realm gate. Accepts the legacy learner credential keys and
/// hydrates the in-memory session from whichever credential it found.
#[derive(Debug, Clone, Copy, Default)]
pub struct LearnerGate;

#[async_trait]
impl GuardRule for LearnerGate {
    fn name(&self) -> &'static str {
        "learner_gate"
    }

    fn applies(&self, route: &ResolvedRoute) -> bool {
        route.flags().requires(Realm::Learner)
    }

    async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<Verdict, GuardError> {
        let Some(credential) = ctx.valid_credential(Realm::Learner) else {
            return ctx.deny(Realm::Learner);
        };

        let store = ctx.store(Realm::Learner);
        if !store.is_authenticated() && store.snapshot().access_credential.is_empty() {
            ctx.ensure_current()?;
            store.set_access_credential(credential);
        }

        Ok(Verdict::Continue)
    }
}

/// Redirect to a pending forced action of `realm`, loading the principal
/// first if the session has none yet.
#[derive(Debug, Clone, Copy)]
pub struct ForcedActionGate {
    realm: Realm,
}

impl ForcedActionGate {
    pub fn new(realm: Realm) -> Self {
        Self { realm }
    }
}

#[async_trait]
impl GuardRule for ForcedActionGate {
    fn name(&self) -> &'static str {
        "forced_action"
    }

    fn applies(&self, route: &ResolvedRoute) -> bool {
        route.flags().requires(self.realm)
            && !route.flags().skip_forced_action
            && route.kind() != RouteKind::ForcedAction
    }

    async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<Verdict, GuardError> {
        if !ctx.forced_actions.has_policies(self.realm) {
            return Ok(Verdict::Continue);
        }

        let store = ctx.store(self.realm);
        let principal = match store.principal() {
            Some(principal) => principal,
            None => {
                ctx.ensure_current()?;
                let ticket = ctx.ticket.clone();
                store
                    .fetch_principal_if(move || ticket.is_current())
                    .await?
                    .ok_or(GuardError::Superseded)?
            }
        };

        match ctx.forced_actions.pending(self.realm, &principal) {
            Some(policy) if policy.target != ctx.route.path => {
                tracing::info!(realm = %self.realm, action = policy.name, "forced action pending");
                Ok(redirect(&policy.target))
            }
            _ => Ok(Verdict::Continue),
        }
    }
}

/// The platform's rule table, in evaluation order.
pub fn default_rules() -> Vec<Arc<dyn GuardRule>> {
    vec![
        Arc::new(RealmGate::new(Realm::ChannelPartner)),
        Arc::new(LoginRedirect::new(Realm::ChannelPartner)),
        Arc::new(RealmGate::new(Realm::Instructor)),
        Arc::new(LoginRedirect::new(Realm::Instructor)),
        Arc::new(RealmGate::new(Realm::InstitutionAdmin)),
        Arc::new(LearnerGate),
        Arc::new(LoginRedirect::new(Realm::Learner)),
        Arc::new(LoginRedirect::new(Realm::InstitutionAdmin)),
        Arc::new(ForcedActionGate::new(Realm::Learner)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_order() {
        let names: Vec<_> = default_rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            [
                "channel_gate",
                "channel_login",
                "instructor_gate",
                "instructor_login",
                "admin_gate",
                "learner_gate",
                "learner_login",
                "admin_login",
                "forced_action",
            ]
        );
    }
}
