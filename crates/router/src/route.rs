//! Route declarations and path matching.
//!
//! Each navigable destination carries static [`RouteMetadata`]: which realm
//! (if any) must be authenticated, display title, and guard flags. Static
//! redirects and the catch-all fallback are resolved here, before any guard
//! runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use campusgate_core::Realm;

use crate::error::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
}

/// Path pattern with literal segments, `:param` and a trailing `:param?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason,
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        let mut segments = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            let segment = match part.strip_prefix(':') {
                Some(param) => {
                    let (name, optional) = match param.strip_suffix('?') {
                        Some(name) => (name, true),
                        None => (param, false),
                    };
                    if name.is_empty() {
                        return Err(invalid("empty parameter name"));
                    }
                    Segment::Param {
                        name: name.to_string(),
                        optional,
                    }
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        let last = segments.len().saturating_sub(1);
        let misplaced_optional = segments
            .iter()
            .enumerate()
            .any(|(i, s)| matches!(s, Segment::Param { optional: true, .. }) && i != last);
        if misplaced_optional {
            return Err(invalid("optional parameter must be the last segment"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Captured parameters if `path` (already normalized) matches.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        let mut params = BTreeMap::new();

        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Literal(expected), Some(part)) if expected == part => {}
                (Segment::Param { name, .. }, Some(part)) => {
                    params.insert(name.clone(), part.to_string());
                }
                (Segment::Param { optional: true, .. }, None) => {}
                _ => return None,
            }
        }

        match parts.next() {
            Some(_) => None,
            None => Some(params),
        }
    }
}

impl core::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for RoutePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Strip query and fragment, collapse empty segments and trailing slashes.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Guard-relevant flags of a destination, plus the display-only
/// `hide_sidebar` hint.
///
/// A destination requires the learner realm when it is neither anonymous
/// nor flagged for one of the other realms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteFlags {
    pub requires_channel_auth: bool,
    pub requires_instructor_auth: bool,
    pub requires_admin_auth: bool,
    pub allow_anonymous: bool,
    pub skip_forced_action: bool,
    /// Layout hint for the host shell: render without the navigation
    /// sidebar. Display-only; no guard rule reads it.
    pub hide_sidebar: bool,
}

impl RouteFlags {
    pub const PUBLIC: Self = Self {
        requires_channel_auth: false,
        requires_instructor_auth: false,
        requires_admin_auth: false,
        allow_anonymous: true,
        skip_forced_action: false,
        hide_sidebar: false,
    };

    pub const LEARNER: Self = Self {
        allow_anonymous: false,
        ..Self::PUBLIC
    };

    /// Flags requiring `realm`.
    pub const fn realm(realm: Realm) -> Self {
        let mut flags = Self::LEARNER;
        match realm {
            Realm::Learner => {}
            Realm::Instructor => flags.requires_instructor_auth = true,
            Realm::InstitutionAdmin => flags.requires_admin_auth = true,
            Realm::ChannelPartner => flags.requires_channel_auth = true,
        }
        flags
    }

    pub const fn skipping_forced_action(mut self) -> Self {
        self.skip_forced_action = true;
        self
    }

    pub const fn without_sidebar(mut self) -> Self {
        self.hide_sidebar = true;
        self
    }

    pub fn requires(&self, realm: Realm) -> bool {
        match realm {
            Realm::ChannelPartner => self.requires_channel_auth,
            Realm::Instructor => self.requires_instructor_auth,
            Realm::InstitutionAdmin => self.requires_admin_auth,
            Realm::Learner => !self.allow_anonymous && !self.requires_privileged_realm(),
        }
    }

    /// Required realms in guard precedence order. Normally at most one.
    pub fn required_realms(&self) -> impl Iterator<Item = Realm> + '_ {
        Realm::PRECEDENCE.into_iter().filter(move |realm| self.requires(*realm))
    }

    fn requires_privileged_realm(&self) -> bool {
        self.requires_channel_auth || self.requires_instructor_auth || self.requires_admin_auth
    }
}

/// Role a destination plays in the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "realm", rename_all = "snake_case")]
pub enum RouteKind {
    Page,
    Login(Realm),
    Home(Realm),
    /// Page on which a pending forced action is completed.
    ForcedAction,
}

/// One declared destination. `flags.hide_sidebar` is carried for the host
/// layout only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMetadata {
    pub pattern: RoutePattern,
    pub name: String,
    pub title: Option<String>,
    pub kind: RouteKind,
    pub flags: RouteFlags,
    /// Static redirect target, followed before guards run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// A path resolved to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Path as requested (normalized).
    pub requested: String,
    /// Path of the destination after static redirects.
    pub path: String,
    pub metadata: Arc<RouteMetadata>,
    pub params: BTreeMap<String, String>,
}

impl ResolvedRoute {
    pub fn flags(&self) -> &RouteFlags {
        &self.metadata.flags
    }

    pub fn kind(&self) -> RouteKind {
        self.metadata.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Ordered route declarations; the first matching pattern wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Arc<RouteMetadata>>,
    fallback: String,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The platform's learner, instructor, administrator and channel pages.
    pub fn standard() -> Result<Self, RouteError> {
        crate::catalog::standard_routes()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteMetadata>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Where unmatched paths go.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// First declaration matching `path`, without following redirects.
    pub fn lookup(&self, path: &str) -> Option<(Arc<RouteMetadata>, BTreeMap<String, String>)> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(&path).map(|params| (route.clone(), params)))
    }

    /// Resolve `path`, following static redirects and the catch-all.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, RouteError> {
        let requested = normalize_path(path);
        let mut current = requested.clone();

        for _ in 0..=self.routes.len() + 1 {
            match self.lookup(&current) {
                Some((route, _)) if route.redirect.is_some() => {
                    let target = route.redirect.as_deref().unwrap_or_default();
                    tracing::trace!(from = %current, to = target, "static redirect");
                    current = normalize_path(target);
                }
                Some((metadata, params)) => {
                    return Ok(ResolvedRoute {
                        requested,
                        path: current,
                        metadata,
                        params,
                    });
                }
                None if current == self.fallback => return Err(RouteError::Unmatched(current)),
                None => {
                    tracing::debug!(path = %current, "unmatched path; using fallback");
                    current = self.fallback.clone();
                }
            }
        }

        Err(RouteError::RedirectCycle(requested))
    }
}

#[derive(Debug, Clone)]
struct PendingRoute {
    pattern: String,
    name: String,
    title: Option<String>,
    kind: RouteKind,
    flags: RouteFlags,
    redirect: Option<String>,
}

/// Collects declarations; patterns are validated by [`RouteTableBuilder::build`].
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    pending: Vec<PendingRoute>,
    fallback: String,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            fallback: "/".to_string(),
        }
    }
}

impl RouteTableBuilder {
    pub fn route(
        mut self,
        pattern: &str,
        name: &str,
        title: Option<&str>,
        kind: RouteKind,
        flags: RouteFlags,
    ) -> Self {
        self.pending.push(PendingRoute {
            pattern: pattern.to_string(),
            name: name.to_string(),
            title: title.map(str::to_string),
            kind,
            flags,
            redirect: None,
        });
        self
    }

    pub fn login(self, pattern: &str, name: &str, title: &str, realm: Realm) -> Self {
        self.route(pattern, name, Some(title), RouteKind::Login(realm), RouteFlags::PUBLIC)
    }

    pub fn redirect(mut self, pattern: &str, name: &str, kind: RouteKind, target: &str) -> Self {
        self.pending.push(PendingRoute {
            pattern: pattern.to_string(),
            name: name.to_string(),
            title: None,
            kind,
            flags: RouteFlags::PUBLIC,
            redirect: Some(target.to_string()),
        });
        self
    }

    /// Declare pages nested under `prefix`, sharing `flags` and a title suffix.
    pub fn section(
        mut self,
        prefix: &str,
        flags: RouteFlags,
        title_suffix: &str,
        declare: impl FnOnce(Section) -> Section,
    ) -> Self {
        let section = declare(Section {
            prefix: prefix.trim_end_matches('/').to_string(),
            flags,
            title_suffix: title_suffix.to_string(),
            pending: Vec::new(),
        });
        self.pending.extend(section.pending);
        self
    }

    pub fn fallback(mut self, path: &str) -> Self {
        self.fallback = normalize_path(path);
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut names = BTreeSet::new();
        let mut routes = Vec::with_capacity(self.pending.len());

        for pending in self.pending {
            if !names.insert(pending.name.clone()) {
                return Err(RouteError::DuplicateName(pending.name));
            }
            routes.push(Arc::new(RouteMetadata {
                pattern: RoutePattern::parse(&pending.pattern)?,
                name: pending.name,
                title: pending.title,
                kind: pending.kind,
                flags: pending.flags,
                redirect: pending.redirect.map(|target| normalize_path(&target)),
            }));
        }

        Ok(RouteTable {
            routes,
            fallback: self.fallback,
        })
    }
}

/// Nested declarations inheriting a prefix and flags.
#[derive(Debug, Clone)]
pub struct Section {
    prefix: String,
    flags: RouteFlags,
    title_suffix: String,
    pending: Vec<PendingRoute>,
}

impl Section {
    pub fn page(self, relative: &str, name: &str, title: &str) -> Self {
        let flags = self.flags;
        self.page_with(relative, name, title, flags)
    }

    pub fn page_with(mut self, relative: &str, name: &str, title: &str, flags: RouteFlags) -> Self {
        let route = PendingRoute {
            pattern: self.join(relative),
            name: name.to_string(),
            title: Some(format!("{title}{}", self.title_suffix)),
            kind: RouteKind::Page,
            flags,
            redirect: None,
        };
        self.pending.push(route);
        self
    }

    /// Page with a title used verbatim (no section suffix).
    pub fn bare_page(mut self, relative: &str, name: &str, title: &str, flags: RouteFlags) -> Self {
        let route = PendingRoute {
            pattern: self.join(relative),
            name: name.to_string(),
            title: Some(title.to_string()),
            kind: RouteKind::Page,
            flags,
            redirect: None,
        };
        self.pending.push(route);
        self
    }

    pub fn home(mut self, name: &str, title: &str, realm: Realm) -> Self {
        let route = PendingRoute {
            pattern: self.join(""),
            name: name.to_string(),
            title: Some(format!("{title}{}", self.title_suffix)),
            kind: RouteKind::Home(realm),
            flags: self.flags,
            redirect: None,
        };
        self.pending.push(route);
        self
    }

    pub fn redirect(mut self, relative: &str, name: &str, kind: RouteKind, target: &str) -> Self {
        let route = PendingRoute {
            pattern: self.join(relative),
            name: name.to_string(),
            title: None,
            kind,
            flags: self.flags,
            redirect: Some(target.to_string()),
        };
        self.pending.push(route);
        self
    }

    fn join(&self, relative: &str) -> String {
        match relative.trim_matches('/') {
            "" if self.prefix.is_empty() => "/".to_string(),
            "" => self.prefix.clone(),
            relative => format!("{}/{relative}", self.prefix),
        }
    }
}
