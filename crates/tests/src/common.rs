use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use auth_core::identity::FirebaseEndpoints;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const API_KEY: &str = "test-api-key";
pub const PASSWORD: &str = "correct-horse";
pub const UID: &str = "uid-ana";

static TRACING: Once = Once::new();

/// Events emitted by `auth_core` while a [`capture_logs`] guard is held.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    /// Number of captured events at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    /// Targets of captured events at `level`, in emission order.
    pub fn targets(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, target)| target.clone())
            .collect()
    }
}

struct CaptureLayer(CapturedLogs);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with("auth_core") {
            self.0
                .events
                .lock()
                .unwrap()
                .push((*meta.level(), meta.target().to_string()));
        }
    }
}

/// Capture `auth_core` events on the current thread until the guard drops.
/// `#[tokio::test]` runs on a single thread, so the stub servers' tasks and
/// the code under test both report here.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(logs.clone()));
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

/// Route `tracing` output through the test harness. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Bind an ephemeral local port and serve `router` on it.
async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server failed");
    });
    addr
}

#[derive(Clone)]
struct ProfileStub {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    authorization: Arc<Mutex<Vec<String>>>,
}

/// Stub of the backend's `/users/me` endpoint with a fixed response.
pub struct ProfileBackend {
    addr: SocketAddr,
    stub: ProfileStub,
}

impl ProfileBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests the endpoint has received.
    pub fn hits(&self) -> usize {
        self.stub.hits.load(Ordering::SeqCst)
    }

    /// `Authorization` headers seen so far, in arrival order.
    pub fn authorization_headers(&self) -> Vec<String> {
        self.stub.authorization.lock().unwrap().clone()
    }
}

async fn users_me(State(stub): State<ProfileStub>, headers: HeaderMap) -> impl IntoResponse {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        stub.authorization.lock().unwrap().push(value.to_string());
    }
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

/// Start a profile backend that answers every request with `status` and `body`.
pub async fn spawn_profile_backend(status: StatusCode, body: &str) -> ProfileBackend {
    let stub = ProfileStub {
        status,
        body: body.to_string(),
        hits: Arc::new(AtomicUsize::new(0)),
        authorization: Arc::new(Mutex::new(Vec::new())),
    };
    let router = Router::new()
        .route("/users/me", get(users_me))
        .with_state(stub.clone());
    let addr = serve(router).await;
    ProfileBackend { addr, stub }
}

/// Profile backend returning a 200 with the given role.
pub async fn spawn_profile_with_role(role: &str) -> ProfileBackend {
    let body = json!({ "uid": UID, "email": "ana@example.com", "role": role }).to_string();
    spawn_profile_backend(StatusCode::OK, &body).await
}

async fn never_answers() -> StatusCode {
    tokio::time::sleep(std::time::Duration::from_secs(300)).await;
    StatusCode::OK
}

/// Profile backend that accepts connections but never responds.
pub async fn spawn_stalled_backend() -> String {
    let addr = serve(Router::new().route("/users/me", get(never_answers))).await;
    format!("http://{addr}")
}

#[derive(Clone)]
struct IdentityStub {
    expires_in: String,
    sign_ins: Arc<AtomicUsize>,
    refreshes: Arc<AtomicUsize>,
    refresh_tokens: Arc<Mutex<Vec<String>>>,
    api_keys: Arc<Mutex<Vec<String>>>,
}

/// Stub of the Firebase Auth emulator's password sign-in and token refresh
/// endpoints. Accepts any email with [`PASSWORD`].
pub struct IdentityProvider {
    addr: SocketAddr,
    stub: IdentityStub,
}

impl IdentityProvider {
    pub fn endpoints(&self) -> FirebaseEndpoints {
        FirebaseEndpoints::emulator(&self.addr.to_string())
    }

    pub fn sign_ins(&self) -> usize {
        self.stub.sign_ins.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.stub.refreshes.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented to the token endpoint.
    pub fn refresh_tokens(&self) -> Vec<String> {
        self.stub.refresh_tokens.lock().unwrap().clone()
    }

    /// `key` query parameters seen across all requests.
    pub fn api_keys(&self) -> Vec<String> {
        self.stub.api_keys.lock().unwrap().clone()
    }
}

fn firebase_error(message: &str) -> (StatusCode, Value) {
    (
        StatusCode::BAD_REQUEST,
        json!({ "error": { "code": 400, "message": message } }),
    )
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

// The emulator paths contain `accounts:signInWithPassword`, so dispatch on
// the raw path instead of the route table.
async fn identity_endpoint(
    State(stub): State<IdentityStub>,
    uri: Uri,
    body: String,
) -> impl IntoResponse {
    if let Some(key) = uri.query().and_then(|q| query_param(q, "key")) {
        stub.api_keys.lock().unwrap().push(key);
    }

    let (status, payload) = match uri.path() {
        "/identitytoolkit.googleapis.com/v1/accounts:signInWithPassword" => {
            stub.sign_ins.fetch_add(1, Ordering::SeqCst);
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let email = request["email"].as_str().unwrap_or_default();
            let password = request["password"].as_str().unwrap_or_default();
            if email.is_empty() {
                firebase_error("MISSING_EMAIL")
            } else if password != PASSWORD {
                firebase_error("INVALID_LOGIN_CREDENTIALS")
            } else {
                (
                    StatusCode::OK,
                    json!({
                        "localId": UID,
                        "email": email,
                        "idToken": "id-1",
                        "refreshToken": "rt-1",
                        "expiresIn": stub.expires_in,
                    }),
                )
            }
        }
        "/securetoken.googleapis.com/v1/token" => {
            let n = stub.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            let presented = query_param(&body, "refresh_token").unwrap_or_default();
            stub.refresh_tokens.lock().unwrap().push(presented);
            (
                StatusCode::OK,
                json!({
                    "id_token": format!("id-refreshed-{n}"),
                    "refresh_token": format!("rt-{}", n + 1),
                    "expires_in": "3600",
                    "user_id": UID,
                }),
            )
        }
        _ => (StatusCode::NOT_FOUND, json!({ "error": { "message": "NOT_FOUND" } })),
    };
    (status, axum::Json(payload))
}

/// Start an identity provider whose sign-ins issue tokens valid for
/// `expires_in` seconds.
pub async fn spawn_identity_provider(expires_in: &str) -> IdentityProvider {
    let stub = IdentityStub {
        expires_in: expires_in.to_string(),
        sign_ins: Arc::new(AtomicUsize::new(0)),
        refreshes: Arc::new(AtomicUsize::new(0)),
        refresh_tokens: Arc::new(Mutex::new(Vec::new())),
        api_keys: Arc::new(Mutex::new(Vec::new())),
    };
    let router = Router::new()
        .fallback(identity_endpoint)
        .with_state(stub.clone());
    let addr = serve(router).await;
    IdentityProvider { addr, stub }
}
