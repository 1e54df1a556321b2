//! Navigation authorization engine.
//!
//! ## Flow
//!
//! 1. Resolve the requested path (static redirects, catch-all)
//! 2. Run the guard rule table against the resolved destination
//! 3. Map unexpected failures through the [`FallbackPolicy`]
//! 4. Drop the result if a newer navigation started meanwhile
//! 5. On proceed, apply the destination title
//!
//! Sessions are injected as a [`SessionRegistry`]; the engine never reaches
//! into ambient state, and it never triggers a hard redirect itself.

use std::sync::Arc;

use tracing::Instrument;

use campusgate_auth::{CredentialCodec, SessionRegistry};
use campusgate_core::{GateConfig, NavigationId};

use crate::error::{GuardError, RouteError};
use crate::fallback::FallbackPolicy;
use crate::forced_action::ForcedActionRegistry;
use crate::generation::{Generation, Ticket};
use crate::route::{ResolvedRoute, RouteTable};
use crate::rules::{self, GuardContext, GuardRule, default_rules};

/// Guard decision for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    RedirectTo(String),
}

/// Result of driving one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Render `path`; `title` has been applied to the shell.
    Proceed { path: String, title: String },
    Redirect(String),
    /// A newer navigation started before this one resolved; nothing applied.
    Superseded,
}

/// Receives the document title of each destination that proceeds.
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str);
}

/// Logs titles (headless hosts).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTitleSink;

impl TitleSink for TracingTitleSink {
    fn set_title(&self, title: &str) {
        tracing::debug!(title, "document title");
    }
}

pub struct NavigationEngine {
    routes: RouteTable,
    sessions: Arc<SessionRegistry>,
    codec: CredentialCodec,
    forced_actions: ForcedActionRegistry,
    rules: Vec<Arc<dyn GuardRule>>,
    fallback: FallbackPolicy,
    titles: Arc<dyn TitleSink>,
    default_title: String,
    max_redirect_hops: usize,
    generation: Generation,
}

impl NavigationEngine {
    pub fn builder(sessions: Arc<SessionRegistry>) -> NavigationEngineBuilder {
        NavigationEngineBuilder::new(sessions)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Guard decision for an already resolved destination.
    ///
    /// Never fails: evaluation errors are mapped by the fallback policy. The
    /// decision is not tied to a navigation generation.
    pub async fn decide(&self, route: &ResolvedRoute) -> Decision {
        let ticket = Ticket::detached();
        match self.evaluate(route, &ticket).await {
            Ok(decision) => decision,
            Err(err) => self.recover(route, &err),
        }
    }

    /// Drive one navigation to `path`. Supersedes any navigation still in flight.
    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        let id = NavigationId::new();
        let ticket = self.generation.begin();
        let span = tracing::info_span!("navigation", id = %id, path = %path, generation = ticket.generation());

        self.run(path, ticket).instrument(span).await
    }

    /// Follow guard redirects from `path` until a destination proceeds (or the
    /// navigation is superseded).
    pub async fn settle(&self, path: &str) -> Result<NavigationOutcome, GuardError> {
        let mut current = path.to_string();

        for _ in 0..=self.max_redirect_hops {
            match self.navigate(&current).await {
                NavigationOutcome::Redirect(next) => current = next,
                outcome => return Ok(outcome),
            }
        }

        tracing::error!(start = %path, hops = self.max_redirect_hops, "redirect loop");
        Err(GuardError::RedirectLoop {
            start: path.to_string(),
            hops: self.max_redirect_hops,
        })
    }

    async fn run(&self, path: &str, ticket: Ticket) -> NavigationOutcome {
        let route = match self.routes.resolve(path) {
            Ok(route) => route,
            Err(err) => return self.unresolvable(&err, &ticket),
        };

        let decision = match self.evaluate(&route, &ticket).await {
            Ok(decision) => decision,
            Err(GuardError::Superseded) => {
                tracing::debug!("superseded during evaluation");
                return NavigationOutcome::Superseded;
            }
            Err(err) => self.recover(&route, &err),
        };

        if !ticket.is_current() {
            tracing::debug!(?decision, "superseded; discarding decision");
            return NavigationOutcome::Superseded;
        }

        match decision {
            Decision::Proceed => {
                let title = route.title().unwrap_or(&self.default_title).to_string();
                self.titles.set_title(&title);
                tracing::info!(destination = %route.path, route = route.name(), "proceed");
                NavigationOutcome::Proceed {
                    path: route.path,
                    title,
                }
            }
            Decision::RedirectTo(target) => {
                tracing::info!(to = %target, "redirect");
                NavigationOutcome::Redirect(target)
            }
        }
    }

    async fn evaluate(&self, route: &ResolvedRoute, ticket: &Ticket) -> Result<Decision, GuardError> {
        let ctx = GuardContext {
            route,
            sessions: &self.sessions,
            codec: &self.codec,
            forced_actions: &self.forced_actions,
            ticket,
        };
        rules::evaluate(&self.rules, &ctx).await
    }

    fn recover(&self, route: &ResolvedRoute, err: &GuardError) -> Decision {
        let decision = self.fallback.decide(route);
        tracing::error!(destination = %route.path, error = %err, fallback = ?decision, "guard evaluation failed");
        decision
    }

    fn unresolvable(&self, err: &RouteError, ticket: &Ticket) -> NavigationOutcome {
        tracing::error!(error = %err, "route resolution failed");
        if ticket.is_current() {
            NavigationOutcome::Redirect(self.routes.fallback().to_string())
        } else {
            NavigationOutcome::Superseded
        }
    }
}

pub struct NavigationEngineBuilder {
    sessions: Arc<SessionRegistry>,
    routes: Option<RouteTable>,
    codec: CredentialCodec,
    forced_actions: ForcedActionRegistry,
    rules: Vec<Arc<dyn GuardRule>>,
    fallback: FallbackPolicy,
    titles: Arc<dyn TitleSink>,
    default_title: String,
    max_redirect_hops: usize,
}

impl NavigationEngineBuilder {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        let defaults = GateConfig::default();
        Self {
            sessions,
            routes: None,
            codec: CredentialCodec::from_config(&defaults),
            forced_actions: ForcedActionRegistry::default(),
            rules: default_rules(),
            fallback: FallbackPolicy::default(),
            titles: Arc::new(TracingTitleSink),
            default_title: defaults.default_title,
            max_redirect_hops: defaults.max_redirect_hops,
        }
    }

    /// Codec, default title and redirect limit from configuration.
    pub fn config(mut self, config: &GateConfig) -> Self {
        self.codec = CredentialCodec::from_config(config);
        self.default_title = config.default_title.clone();
        self.max_redirect_hops = config.max_redirect_hops;
        self
    }

    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn codec(mut self, codec: CredentialCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn forced_actions(mut self, forced_actions: ForcedActionRegistry) -> Self {
        self.forced_actions = forced_actions;
        self
    }

    pub fn rules(mut self, rules: Vec<Arc<dyn GuardRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn title_sink(mut self, titles: Arc<dyn TitleSink>) -> Self {
        self.titles = titles;
        self
    }

    /// Uses [`RouteTable::standard`] unless a table was supplied.
    pub fn build(self) -> Result<NavigationEngine, RouteError> {
        let routes = match self.routes {
            Some(routes) => routes,
            None => RouteTable::standard()?,
        };

        Ok(NavigationEngine {
            routes,
            sessions: self.sessions,
            codec: self.codec,
            forced_actions: self.forced_actions,
            rules: self.rules,
            fallback: self.fallback,
            titles: self.titles,
            default_title: self.default_title,
            max_redirect_hops: self.max_redirect_hops,
            generation: Generation::new(),
        })
    }
}
