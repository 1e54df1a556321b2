use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use tokio::sync::Notify;

use campusgate_auth::{
    CredentialCodec, CredentialPair, GatewayError, InMemoryGateway, LoginCredentials, LoginGrant, Principal,
    RealmGateway, RecordingNavigator, SessionRegistry,
};
use campusgate_core::{GateConfig, KeyValueStore, MemoryStorage, Realm};
use campusgate_router::{
    Decision, GuardContext, GuardError, GuardRule, NavigationEngine, NavigationOutcome, RouteFlags, RouteKind,
    RouteTable, TitleSink, Verdict, default_rules,
};

const LEARNER_HOME_TITLE: &str = "My Courses - Interdisciplinary PBL Platform";

fn mint(expires_in_secs: i64) -> String {
    let claims = json!({
        "sub": "42",
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + expires_in_secs,
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("failed to encode credential")
}

fn valid() -> String {
    mint(3600)
}

fn principal(value: serde_json::Value) -> Principal {
    Principal::from_value(value).unwrap()
}

#[derive(Default)]
struct RecordingTitles(Mutex<Vec<String>>);

impl RecordingTitles {
    fn titles(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl TitleSink for RecordingTitles {
    fn set_title(&self, title: &str) {
        self.0.lock().unwrap().push(title.to_string());
    }
}

struct Harness {
    storage: Arc<MemoryStorage>,
    navigator: Arc<RecordingNavigator>,
    titles: Arc<RecordingTitles>,
    sessions: Arc<SessionRegistry>,
    engine: NavigationEngine,
}

struct HarnessBuilder {
    entries: Vec<(&'static str, String)>,
    learner: Arc<dyn RealmGateway>,
    codec: CredentialCodec,
    routes: Option<RouteTable>,
    rules: Option<Vec<Arc<dyn GuardRule>>>,
    hydrate: bool,
}

impl HarnessBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            learner: Arc::new(InMemoryGateway::new()),
            codec: CredentialCodec::new(),
            routes: None,
            rules: None,
            hydrate: true,
        }
    }

    fn entry(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.entries.push((key, value.into()));
        self
    }

    fn learner_gateway(mut self, gateway: Arc<dyn RealmGateway>) -> Self {
        self.learner = gateway;
        self
    }

    fn codec(mut self, codec: CredentialCodec) -> Self {
        self.codec = codec;
        self
    }

    fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    fn rules(mut self, rules: Vec<Arc<dyn GuardRule>>) -> Self {
        self.rules = Some(rules);
        self
    }

    fn without_hydration(mut self) -> Self {
        self.hydrate = false;
        self
    }

    fn build(self) -> Harness {
        let storage = Arc::new(MemoryStorage::with_entries(self.entries));
        let navigator = Arc::new(RecordingNavigator::new());
        let titles = Arc::new(RecordingTitles::default());

        let sessions = Arc::new(
            SessionRegistry::builder(storage.clone(), navigator.clone())
                .gateway(Realm::Learner, self.learner)
                .build(),
        );
        if self.hydrate {
            sessions.init_from_storage();
        }

        let mut engine = NavigationEngine::builder(sessions.clone())
            .codec(self.codec)
            .title_sink(titles.clone());
        if let Some(routes) = self.routes {
            engine = engine.routes(routes);
        }
        if let Some(rules) = self.rules {
            engine = engine.rules(rules);
        }

        Harness {
            storage,
            navigator,
            titles,
            sessions,
            engine: engine.build().unwrap(),
        }
    }
}

fn learner_signed_in() -> HarnessBuilder {
    HarnessBuilder::new()
        .entry("access_token", valid())
        .entry("refresh_token", "r")
        .entry("user_info", r#"{"id":1,"name":"Wang Fang"}"#)
}

fn redirect(path: &str) -> NavigationOutcome {
    NavigationOutcome::Redirect(path.to_string())
}

#[tokio::test]
async fn empty_sessions_never_reach_protected_pages() {
    let h = HarnessBuilder::new().build();

    for (realm, path) in [
        (Realm::Learner, "/profile"),
        (Realm::Instructor, "/teacher/dashboard"),
        (Realm::InstitutionAdmin, "/admin/courses"),
        (Realm::ChannelPartner, "/channel/schools/3"),
    ] {
        assert!(!h.sessions.store(realm).is_authenticated());
        assert_eq!(h.engine.navigate(path).await, redirect(realm.login_path()), "{path}");
    }
    assert!(h.titles.titles().is_empty());
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn valid_learner_on_login_goes_home() {
    let h = learner_signed_in().build();

    assert_eq!(h.engine.navigate("/login").await, redirect("/"));
    assert_eq!(
        h.engine.settle("/login").await.unwrap(),
        NavigationOutcome::Proceed {
            path: "/courses".into(),
            title: LEARNER_HOME_TITLE.into(),
        }
    );
    assert_eq!(h.titles.titles(), vec![LEARNER_HOME_TITLE.to_string()]);
}

#[tokio::test]
async fn empty_admin_session_is_cleared_and_sent_to_login() {
    let h = learner_signed_in()
        .entry("admin_refresh_token", "stale")
        .entry("admin_info", r#"{"role":"platform_admin"}"#)
        .build();

    assert_eq!(h.engine.navigate("/admin/courses").await, redirect("/admin/login"));

    for key in Realm::InstitutionAdmin.storage_keys().all() {
        assert!(!h.storage.contains(key), "{key} not removed");
    }
    assert!(h.storage.contains("access_token"), "learner keys must be untouched");
    assert!(h.sessions.store(Realm::Learner).is_authenticated());
}

#[tokio::test]
async fn expired_learner_credential_clears_every_learner_key() {
    let h = HarnessBuilder::new()
        .entry("student_access_token", mint(-1))
        .entry("student_refresh_token", "r")
        .entry("user_info", r#"{"id":1}"#)
        .build();

    assert_eq!(h.engine.navigate("/projects").await, redirect("/login"));
    assert!(h.storage.snapshot().is_empty());
    assert!(h.sessions.store(Realm::Learner).snapshot().is_empty());
}

#[tokio::test]
async fn pending_password_change_overrides_destination() {
    let h = HarnessBuilder::new()
        .entry("access_token", valid())
        .entry("user_info", r#"{"id":1,"need_change_password":true}"#)
        .build();

    assert_eq!(h.engine.navigate("/profile").await, redirect("/change-password"));

    match h.engine.navigate("/change-password").await {
        NavigationOutcome::Proceed { path, .. } => assert_eq!(path, "/change-password"),
        other => panic!("expected proceed, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_principal_is_fetched_before_forced_action_check() {
    let gateway = Arc::new(
        InMemoryGateway::new().with_principal(Ok(principal(json!({ "id": 1, "need_change_password": true })))),
    );
    let h = HarnessBuilder::new()
        .entry("access_token", valid())
        .learner_gateway(gateway.clone())
        .build();

    assert_eq!(h.engine.navigate("/my-tasks").await, redirect("/change-password"));
    assert_eq!(gateway.calls().fetch_principal, 1);
    assert!(h.storage.contains("user_info"));

    // Loaded once; the next check uses the in-memory principal.
    h.engine.navigate("/portfolio").await;
    assert_eq!(gateway.calls().fetch_principal, 1);
}

#[tokio::test]
async fn unhydrated_learner_session_adopts_legacy_credential() {
    let credential = valid();
    let gateway = Arc::new(InMemoryGateway::new().with_principal(Ok(principal(json!({ "id": 5 })))));
    let h = HarnessBuilder::new()
        .entry("student_access_token", credential.clone())
        .learner_gateway(gateway)
        .without_hydration()
        .build();

    match h.engine.navigate("/tasks/9").await {
        NavigationOutcome::Proceed { path, .. } => assert_eq!(path, "/tasks/9"),
        other => panic!("expected proceed, got {other:?}"),
    }

    let session = h.sessions.store(Realm::Learner).snapshot();
    assert_eq!(session.access_credential, credential);
    assert!(session.is_authenticated());
    assert_eq!(h.storage.get("access_token"), Some(credential));
}

#[tokio::test]
async fn school_level_admin_is_redirected_from_generic_home() {
    let h = HarnessBuilder::new()
        .entry("admin_access_token", valid())
        .entry("admin_info", r#"{"id":3,"role":"teacher"}"#)
        .build();

    assert_eq!(h.engine.navigate("/admin").await, redirect("/admin/classes"));
    assert_eq!(h.engine.navigate("/admin/login").await, redirect("/admin/classes"));
    assert_eq!(h.engine.navigate("/platform-admin/login").await, redirect("/admin/classes"));

    match h.engine.navigate("/admin/classes").await {
        NavigationOutcome::Proceed { title, .. } => {
            assert_eq!(title, "Project Course Management - PBL Admin Console")
        }
        other => panic!("expected proceed, got {other:?}"),
    }
}

#[tokio::test]
async fn platform_admin_stays_on_generic_home() {
    let h = HarnessBuilder::new()
        .entry("admin_access_token", valid())
        .entry("admin_info", r#"{"id":3,"role":"super_admin"}"#)
        .build();

    assert!(matches!(
        h.engine.navigate("/admin").await,
        NavigationOutcome::Proceed { .. }
    ));
    assert_eq!(h.engine.navigate("/admin/login").await, redirect("/admin"));
}

#[tokio::test]
async fn malformed_admin_principal_counts_as_platform_level() {
    let h = HarnessBuilder::new()
        .entry("admin_access_token", valid())
        .entry("admin_info", "{broken")
        .without_hydration()
        .build();

    assert!(matches!(
        h.engine.navigate("/admin").await,
        NavigationOutcome::Proceed { .. }
    ));
}

#[tokio::test]
async fn ambiguous_declaration_runs_only_the_channel_branch() {
    let both = RouteFlags {
        requires_channel_auth: true,
        ..RouteFlags::realm(Realm::InstitutionAdmin)
    };
    let table = || {
        RouteTable::builder()
            .route("/shared", "Shared", Some("Shared"), RouteKind::Page, both)
            .build()
            .unwrap()
    };

    // Channel valid, administrator absent: proceeds without touching admin state.
    let h = HarnessBuilder::new()
        .entry("channel_access_token", valid())
        .entry("admin_info", r#"{"role":"teacher"}"#)
        .routes(table())
        .without_hydration()
        .build();
    assert!(matches!(
        h.engine.navigate("/shared").await,
        NavigationOutcome::Proceed { .. }
    ));
    assert!(h.storage.contains("admin_info"));

    // Administrator valid, channel absent: still the channel login.
    let h = HarnessBuilder::new()
        .entry("admin_access_token", valid())
        .routes(table())
        .build();
    assert_eq!(h.engine.navigate("/shared").await, redirect("/channel/login"));
    assert!(h.storage.contains("admin_access_token"));
}

#[tokio::test]
async fn signed_in_partner_skips_channel_login() {
    let h = HarnessBuilder::new()
        .entry("channel_access_token", valid())
        .build();

    assert_eq!(h.engine.navigate("/channel/login").await, redirect("/channel"));
    match h.engine.settle("/channel/login").await.unwrap() {
        NavigationOutcome::Proceed { path, .. } => assert_eq!(path, "/channel/dashboard"),
        other => panic!("expected proceed, got {other:?}"),
    }
}

#[tokio::test]
async fn signed_out_partner_sees_channel_login() {
    let h = HarnessBuilder::new().build();

    match h.engine.navigate("/channel/login").await {
        NavigationOutcome::Proceed { title, .. } => {
            assert_eq!(title, "Channel Partner Login - PBL Channel Portal")
        }
        other => panic!("expected proceed, got {other:?}"),
    }
}

#[tokio::test]
async fn synthetic_credentials_only_pass_with_an_enabled_codec() {
    let dev = HarnessBuilder::new()
        .entry("teacher_access_token", "mock_teacher_1")
        .codec(CredentialCodec::with_synthetic_prefix("mock_"))
        .build();
    assert!(matches!(
        dev.engine.navigate("/teacher/courses").await,
        NavigationOutcome::Proceed { .. }
    ));

    let production = HarnessBuilder::new()
        .entry("teacher_access_token", "mock_teacher_1")
        .codec(CredentialCodec::from_config(&GateConfig::default()))
        .build();
    assert_eq!(
        production.engine.navigate("/teacher/courses").await,
        redirect("/teacher/login")
    );
}

#[tokio::test]
async fn collaborator_failure_falls_back_to_login() {
    let gateway = Arc::new(InMemoryGateway::new().with_principal(Err(GatewayError::Transport("reset".into()))));
    let h = HarnessBuilder::new()
        .entry("access_token", valid())
        .learner_gateway(gateway)
        .build();

    assert_eq!(h.engine.navigate("/progress").await, redirect("/login"));
    assert!(h.titles.titles().is_empty());
}

struct FailingRule;

#[async_trait]
impl GuardRule for FailingRule {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn applies(&self, _route: &campusgate_router::ResolvedRoute) -> bool {
        true
    }

    async fn evaluate(&self, _ctx: &GuardContext<'_>) -> Result<Verdict, GuardError> {
        Err(GuardError::Collaborator(GatewayError::InvalidResponse("boom".into())))
    }
}

#[tokio::test]
async fn fallback_policy_is_explicit() {
    let h = HarnessBuilder::new().rules(vec![Arc::new(FailingRule)]).build();

    assert_eq!(h.engine.navigate("/admin/users").await, redirect("/admin/login"));
    assert_eq!(h.engine.navigate("/teacher/profile").await, redirect("/teacher/login"));
    assert_eq!(h.engine.navigate("/outputs").await, redirect("/login"));
    assert!(matches!(
        h.engine.navigate("/login").await,
        NavigationOutcome::Proceed { .. }
    ));
}

struct Bounce;

#[async_trait]
impl GuardRule for Bounce {
    fn name(&self) -> &'static str {
        "bounce"
    }

    fn applies(&self, _route: &campusgate_router::ResolvedRoute) -> bool {
        true
    }

    async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<Verdict, GuardError> {
        let next = if ctx.route.path == "/ping" { "/pong" } else { "/ping" };
        Ok(Verdict::Decide(Decision::RedirectTo(next.into())))
    }
}

#[tokio::test]
async fn settle_reports_redirect_loops() {
    let routes = RouteTable::builder()
        .route("/ping", "Ping", None, RouteKind::Page, RouteFlags::PUBLIC)
        .route("/pong", "Pong", None, RouteKind::Page, RouteFlags::PUBLIC)
        .build()
        .unwrap();
    let h = HarnessBuilder::new()
        .routes(routes)
        .rules(vec![Arc::new(Bounce)])
        .build();

    let err = h.engine.settle("/ping").await.unwrap_err();
    assert_eq!(
        err,
        GuardError::RedirectLoop {
            start: "/ping".into(),
            hops: GateConfig::default().max_redirect_hops,
        }
    );
}

#[tokio::test]
async fn untitled_destinations_use_default_title() {
    let routes = RouteTable::builder()
        .route("/about", "About", None, RouteKind::Page, RouteFlags::PUBLIC)
        .build()
        .unwrap();
    let h = HarnessBuilder::new().routes(routes).rules(default_rules()).build();

    assert_eq!(
        h.engine.navigate("/about").await,
        NavigationOutcome::Proceed {
            path: "/about".into(),
            title: GateConfig::default().default_title,
        }
    );
}

#[tokio::test]
async fn decide_evaluates_a_resolved_destination() {
    let h = learner_signed_in().build();

    let login = h.engine.routes().resolve("/login").unwrap();
    assert_eq!(h.engine.decide(&login).await, Decision::RedirectTo("/".into()));

    let courses = h.engine.routes().resolve("/courses").unwrap();
    assert_eq!(h.engine.decide(&courses).await, Decision::Proceed);
    assert!(h.titles.titles().is_empty(), "decide has no title side effect");
}

/// Gateway whose "who am I" call waits until released.
struct GatedGateway {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl RealmGateway for GatedGateway {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginGrant, GatewayError> {
        Err(GatewayError::Offline)
    }

    async fn refresh(&self, _refresh_credential: &str) -> Result<CredentialPair, GatewayError> {
        Err(GatewayError::Offline)
    }

    async fn fetch_principal(&self) -> Result<Principal, GatewayError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(principal(json!({ "id": 1, "need_change_password": true })))
    }
}

#[tokio::test]
async fn newer_navigation_supersedes_one_in_flight() {
    let gateway = Arc::new(GatedGateway {
        started: Notify::new(),
        release: Notify::new(),
    });
    let h = HarnessBuilder::new()
        .entry("access_token", valid())
        .learner_gateway(gateway.clone())
        .build();

    let stale = h.engine.navigate("/profile");
    let newer = async {
        gateway.started.notified().await;
        let outcome = h.engine.navigate("/login").await;
        gateway.release.notify_one();
        outcome
    };

    let (stale, newer) = tokio::join!(stale, newer);

    assert_eq!(stale, NavigationOutcome::Superseded);
    assert_eq!(newer, redirect("/"));
    assert_eq!(h.sessions.store(Realm::Learner).principal(), None);
    assert!(!h.storage.contains("user_info"));
    assert!(h.titles.titles().is_empty());
}

#[tokio::test]
async fn logout_is_the_only_hard_redirect() {
    let h = learner_signed_in().build();

    h.engine.navigate("/admin/courses").await;
    assert!(h.navigator.visited().is_empty());

    h.sessions.store(Realm::Learner).logout();
    assert_eq!(h.navigator.visited(), vec!["/login".to_string()]);
    assert_eq!(h.engine.navigate("/courses").await, redirect("/login"));
}
