//! `campusgate-router`: route metadata and the navigation authorization engine.
//!
//! A navigation request is resolved against the [`RouteTable`], then the
//! ordered [`GuardRule`] table decides whether it proceeds or redirects.
//! Unexpected failures never escape: the [`FallbackPolicy`] maps them to the
//! safest redirect for the target.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod forced_action;
pub mod generation;
pub mod route;
pub mod rules;

pub use engine::{
    Decision, NavigationEngine, NavigationEngineBuilder, NavigationOutcome, TitleSink, TracingTitleSink,
};
pub use error::{GuardError, RouteError};
pub use fallback::FallbackPolicy;
pub use forced_action::{
    FORCED_ACTION_PAGE, ForcedActionPolicy, ForcedActionRegistry, PrincipalPredicate, needs_password_change,
};
pub use generation::{Generation, Ticket};
pub use route::{
    ResolvedRoute, RouteFlags, RouteKind, RouteMetadata, RoutePattern, RouteTable, RouteTableBuilder, Section,
    normalize_path,
};
pub use rules::{
    ForcedActionGate, GuardContext, GuardRule, LearnerGate, LoginRedirect, RealmGate, Verdict, default_rules,
};
