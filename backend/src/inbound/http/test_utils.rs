//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, Resource, test, web};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mockable::Clock;
use serde::Deserialize;

use crate::domain::ports::NoOpNotificationSink;
use crate::domain::{Caller, Error, UserId, UserRole};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, StoragePorts};
use crate::outbound::memory::{
    MemoryAuditLog, MemoryBookmarkStore, MemoryListingIndex, MemoryListingStore,
    MemoryNotificationInbox, MemoryReportLedger, MemoryViewLog,
};
use crate::test_support::MutableClock;

/// Path of the login shim mounted by [`login_resource`].
pub const LOGIN_PATH: &str = "/__test/login";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

#[derive(Deserialize)]
struct LoginBody {
    user_id: String,
    role: String,
}

/// Stand-in for the identity service: writes the posted caller into the
/// session so tests can obtain a real cookie.
pub fn login_resource() -> Resource {
    web::resource(LOGIN_PATH).route(web::post().to(
        |session: SessionContext, body: web::Json<LoginBody>| async move {
            let user_id = UserId::new(&body.user_id)
                .map_err(|error| Error::invalid_request(error.to_string()))?;
            let role = body
                .role
                .parse::<UserRole>()
                .map_err(|error| Error::invalid_request(error.to_string()))?;
            session.persist_caller(&Caller::new(user_id, role))?;
            Ok::<_, Error>(HttpResponse::NoContent().finish())
        },
    ))
}

/// Log `caller` in through [`login_resource`] and return the cookie.
pub async fn login<S, B>(app: &S, caller: &Caller) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(LOGIN_PATH)
            .set_json(serde_json::json!({
                "user_id": caller.user_id.as_ref(),
                "role": caller.role.as_str(),
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test login failed: {}", res.status());
    session_cookie(&res)
}

/// Fresh in-memory storage ports.
pub fn memory_storage() -> StoragePorts {
    StoragePorts {
        listings: Arc::new(MemoryListingStore::default()),
        index: Arc::new(MemoryListingIndex::default()),
        views: Arc::new(MemoryViewLog::default()),
        bookmarks: Arc::new(MemoryBookmarkStore::default()),
        reports: Arc::new(MemoryReportLedger::default()),
        audit: Arc::new(MemoryAuditLog::default()),
        notifications: Arc::new(MemoryNotificationInbox::default()),
    }
}

/// Clock pinned to a fixed instant.
pub fn test_clock() -> Arc<MutableClock> {
    let now = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(MutableClock::new(now))
}

/// Handler state over in-memory storage with notifications discarded.
pub fn memory_state(clock: Arc<MutableClock>) -> HttpState {
    let clock: Arc<dyn Clock> = clock;
    HttpState::from_storage(memory_storage(), Arc::new(NoOpNotificationSink), clock)
}

/// A caller with a fresh identity.
pub fn caller(role: UserRole) -> Caller {
    Caller::new(UserId::random(), role)
}

/// Minimal valid create payload.
pub fn listing_json(title: &str, location: &str, bedrooms: u32, price: u64) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "apartmentType": "2-bedroom",
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

/// App exposing the full API over `state` with the test login shim.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(login_resource())
        .service(web::scope("/api/v1").configure(super::api_routes))
}
