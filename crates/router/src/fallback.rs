//! Safest decision after an unexpected guard failure.

use campusgate_core::Realm;

use crate::engine::Decision;
use crate::route::ResolvedRoute;

/// Maps a failed evaluation to a redirect to the login page of the first
/// realm (in this policy's order) the target requires. Targets requiring no
/// realm proceed.
///
/// The default order puts administrators before the learner realm, so an
/// ambiguous declaration fails toward the administrator login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    order: Vec<Realm>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            order: vec![
                Realm::InstitutionAdmin,
                Realm::ChannelPartner,
                Realm::Instructor,
                Realm::Learner,
            ],
        }
    }
}

impl FallbackPolicy {
    pub fn new(order: Vec<Realm>) -> Self {
        Self { order }
    }

    pub fn decide(&self, route: &ResolvedRoute) -> Decision {
        self.order
            .iter()
            .find(|realm| route.flags().requires(**realm))
            .map(|realm| Decision::RedirectTo(realm.login_path().to_string()))
            .unwrap_or(Decision::Proceed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RouteFlags, RouteKind, RouteTable};

    fn resolve(flags: RouteFlags) -> ResolvedRoute {
        RouteTable::builder()
            .route("/target", "Target", None, RouteKind::Page, flags)
            .build()
            .unwrap()
            .resolve("/target")
            .unwrap()
    }

    #[test]
    fn admin_wins_ambiguous_declarations() {
        let flags = RouteFlags {
            requires_channel_auth: true,
            ..RouteFlags::realm(Realm::InstitutionAdmin)
        };

        assert_eq!(
            FallbackPolicy::default().decide(&resolve(flags)),
            Decision::RedirectTo("/admin/login".into())
        );
    }

    #[test]
    fn each_realm_maps_to_its_login() {
        let policy = FallbackPolicy::default();
        for realm in Realm::ALL {
            assert_eq!(
                policy.decide(&resolve(RouteFlags::realm(realm))),
                Decision::RedirectTo(realm.login_path().into()),
                "{realm}"
            );
        }
    }

    #[test]
    fn anonymous_targets_proceed() {
        assert_eq!(
            FallbackPolicy::default().decide(&resolve(RouteFlags::PUBLIC)),
            Decision::Proceed
        );
    }
}
