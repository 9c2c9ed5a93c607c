//! Live server harness for black-box API tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Storage is in-memory and
//! notifications flow through the real inbox notifier, so every suite
//! exercises the same wiring the binary uses without PostgreSQL.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpResponse, HttpServer, web};
use awc::Client;
use mockable::{Clock, DefaultClock};
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use rentals::Trace;
use rentals::domain::ports::NotificationSink;
use rentals::domain::{Caller, Error, TRACE_ID_HEADER, UserId, UserRole};
use rentals::inbound::http::api_routes;
use rentals::inbound::http::session::SessionContext;
use rentals::inbound::http::state::{HttpState, StoragePorts};
use rentals::outbound::memory::{
    MemoryAuditLog, MemoryBookmarkStore, MemoryListingIndex, MemoryListingStore,
    MemoryNotificationInbox, MemoryReportLedger, MemoryViewLog,
};
use rentals::outbound::notifications::{InboxNotifier, PresenceRegistry};

const LOGIN_PATH: &str = "/__test/login";

/// Last response seen by the harness.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: u16,
    pub body: Value,
    pub trace_id: Option<String>,
}

pub struct MarketWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    cookies: HashMap<String, (Caller, String)>,
    pub last: Option<Captured>,
    pub listings: HashMap<String, String>,
}

pub type SharedWorld = Rc<RefCell<MarketWorld>>;

/// Owns the world and stops the server even if a test panics.
pub struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

#[derive(Deserialize)]
struct LoginBody {
    user_id: String,
    role: String,
}

async fn login_shim(
    session: SessionContext,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse, Error> {
    let user_id =
        UserId::new(&body.user_id).map_err(|error| Error::invalid_request(error.to_string()))?;
    let role = body
        .role
        .parse::<UserRole>()
        .map_err(|error| Error::invalid_request(error.to_string()))?;
    session.persist_caller(&Caller::new(user_id, role))?;
    Ok(HttpResponse::NoContent().finish())
}

fn memory_state() -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let storage = StoragePorts {
        listings: Arc::new(MemoryListingStore::default()),
        index: Arc::new(MemoryListingIndex::default()),
        views: Arc::new(MemoryViewLog::default()),
        bookmarks: Arc::new(MemoryBookmarkStore::default()),
        reports: Arc::new(MemoryReportLedger::default()),
        audit: Arc::new(MemoryAuditLog::default()),
        notifications: Arc::new(MemoryNotificationInbox::default()),
    };
    let notifier: Arc<dyn NotificationSink> = Arc::new(InboxNotifier::new(
        Arc::clone(&storage.notifications),
        Arc::new(PresenceRegistry::new()),
        Arc::clone(&clock),
    ));
    HttpState::from_storage(storage, notifier, clock)
}

fn spawn_server() -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let state = web::Data::new(memory_state());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .cookie_content_security(CookieContentSecurity::Private)
                    .build(),
            )
            .wrap(Trace)
            .route(LOGIN_PATH, web::post().to(login_shim))
            .service(web::scope("/api/v1").configure(api_routes))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

/// Start a fresh server over empty stores.
pub fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let (base_url, server) = local
        .block_on(&runtime, async { spawn_server() })
        .expect("spawn server");
    WorldFixture {
        world: Rc::new(RefCell::new(MarketWorld {
            runtime,
            local,
            base_url,
            server,
            cookies: HashMap::new(),
            last: None,
            listings: HashMap::new(),
        })),
    }
}

fn block_on<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// Log in a new user under `actor` with `role` and keep their cookie.
pub fn login_as(world: &SharedWorld, actor: &str, role: UserRole) -> Caller {
    let caller = Caller::new(UserId::random(), role);
    let payload = serde_json::json!({
        "user_id": caller.user_id.as_ref(),
        "role": role.as_str(),
    });
    let cookie = block_on(world, |base_url| async move {
        let response = Client::default()
            .post(format!("{base_url}{LOGIN_PATH}"))
            .send_json(&payload)
            .await
            .expect("login request");
        assert!(response.status().is_success(), "login shim failed");
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned)
            .expect("session cookie")
    });
    world
        .borrow_mut()
        .cookies
        .insert(actor.to_owned(), (caller.clone(), cookie));
    caller
}

/// The caller behind `actor`.
pub fn caller_of(world: &SharedWorld, actor: &str) -> Caller {
    world
        .borrow()
        .cookies
        .get(actor)
        .map(|(caller, _)| caller.clone())
        .expect("known actor")
}

/// Send a request as `actor` (anonymous when `None`) and record the result.
pub fn request(
    world: &SharedWorld,
    actor: Option<&str>,
    method: Method,
    path: &str,
    payload: Option<Value>,
) -> Captured {
    let cookie = actor.map(|name| {
        world
            .borrow()
            .cookies
            .get(name)
            .map(|(_, cookie)| cookie.clone())
            .expect("known actor")
    });
    let path = path.to_owned();
    let captured = block_on(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await.expect("json request"),
            None => request.send().await.expect("request"),
        };
        let status = response.status().as_u16();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.body().await.expect("body");
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };
        Captured {
            status,
            body,
            trace_id,
        }
    });
    world.borrow_mut().last = Some(captured.clone());
    captured
}

/// Let spawned notification deliveries run.
pub fn settle(world: &SharedWorld) {
    block_on(world, |_| async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    });
}

/// Minimal valid create payload.
pub fn listing_payload(
    title: &str,
    location: &str,
    apartment_type: &str,
    bedrooms: u32,
    price: u64,
) -> Value {
    serde_json::json!({
        "title": title,
        "apartmentType": apartment_type,
        "price": price,
        "paymentFrequency": "yearly",
        "duration": "1 year",
        "location": location,
        "address": "4 Admiralty Way",
        "contactPhone": "+2348000000000",
        "bedrooms": bedrooms,
        "bathrooms": 1
    })
}
