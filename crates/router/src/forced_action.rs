//! Forced-action policies: mandatory interstitial steps that override normal
//! navigation for one realm until satisfied.

use std::sync::Arc;

use campusgate_auth::Principal;
use campusgate_core::Realm;

/// Page where a learner completes a mandatory password change.
pub const FORCED_ACTION_PAGE: &str = "/change-password";

/// Principal field signalling a pending password change.
pub const NEED_CHANGE_PASSWORD: &str = "need_change_password";

/// Predicate over a principal record.
pub type PrincipalPredicate = Arc<dyn Fn(&Principal) -> bool + Send + Sync>;

pub fn needs_password_change(principal: &Principal) -> bool {
    principal.flag(NEED_CHANGE_PASSWORD)
}

/// One `(realm, predicate, target page)` triple.
#[derive(Clone)]
pub struct ForcedActionPolicy {
    pub realm: Realm,
    pub name: &'static str,
    pub target: String,
    predicate: PrincipalPredicate,
}

impl ForcedActionPolicy {
    pub fn new(
        realm: Realm,
        name: &'static str,
        target: impl Into<String>,
        predicate: impl Fn(&Principal) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            realm,
            name,
            target: target.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn password_change() -> Self {
        Self::new(Realm::Learner, "password_change", FORCED_ACTION_PAGE, needs_password_change)
    }

    pub fn is_pending(&self, principal: &Principal) -> bool {
        (self.predicate)(principal)
    }
}

impl core::fmt::Debug for ForcedActionPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ForcedActionPolicy")
            .field("realm", &self.realm)
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Registered policies, consulted in registration order.
#[derive(Debug, Clone)]
pub struct ForcedActionRegistry {
    policies: Vec<ForcedActionPolicy>,
}

impl Default for ForcedActionRegistry {
    fn default() -> Self {
        Self {
            policies: vec![ForcedActionPolicy::password_change()],
        }
    }
}

impl ForcedActionRegistry {
    pub fn empty() -> Self {
        Self { policies: Vec::new() }
    }

    pub fn register(mut self, policy: ForcedActionPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn for_realm(&self, realm: Realm) -> impl Iterator<Item = &ForcedActionPolicy> {
        self.policies.iter().filter(move |p| p.realm == realm)
    }

    pub fn has_policies(&self, realm: Realm) -> bool {
        self.for_realm(realm).next().is_some()
    }

    /// First policy of `realm` pending for `principal`.
    pub fn pending(&self, realm: Realm, principal: &Principal) -> Option<&ForcedActionPolicy> {
        self.for_realm(realm).find(|p| p.is_pending(principal))
    }
}
