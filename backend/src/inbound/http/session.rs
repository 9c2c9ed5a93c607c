//! Caller identity carried in the session cookie.
//!
//! The identity service mints the cookie with the shared key and stores the
//! verified `user_id` and `role`. This service only reads them back; a
//! missing or malformed pair is treated as an anonymous request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Caller, Error, UserId, UserRole};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes the caller stored in the session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store `caller` in the session cookie.
    ///
    /// Production sessions are written by the identity service; this exists
    /// for tooling and tests that share the key.
    pub fn persist_caller(&self, caller: &Caller) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, caller.user_id.as_ref())
            .and_then(|()| self.0.insert(ROLE_KEY, caller.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The verified caller, if the session carries a valid one.
    pub fn caller(&self) -> Result<Option<Caller>, Error> {
        let user_id = self.read(USER_ID_KEY)?;
        let role = self.read(ROLE_KEY)?;
        let (Some(user_id), Some(role)) = (user_id, role) else {
            return Ok(None);
        };
        let user_id = match UserId::new(user_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        match role.parse::<UserRole>() {
            Ok(role) => Ok(Some(Caller::new(user_id, role))),
            Err(error) => {
                warn!(%error, "invalid role in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a caller or return `401 Unauthorized`.
    pub fn require_caller(&self) -> Result<Caller, Error> {
        self.caller()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    let id = UserId::new(FIXTURE_ID).expect("fixture id");
                    session.persist_caller(&Caller::new(id, UserRole::Landlord))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/set-raw/{user}/{role}",
                web::get().to(
                    |session: Session, path: web::Path<(String, String)>| async move {
                        let (user, role) = path.into_inner();
                        session.insert(USER_ID_KEY, user).expect("set user id");
                        session.insert(ROLE_KEY, role).expect("set role");
                        HttpResponse::Ok()
                    },
                ),
            )
            .route(
                "/require",
                web::get().to(|session: SessionContext| async move {
                    let caller = session.require_caller()?;
                    Ok::<_, Error>(
                        HttpResponse::Ok().body(format!("{}:{}", caller.user_id, caller.role)),
                    )
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_caller() {
        let app = test::init_service(session_test_app()).await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, format!("{FIXTURE_ID}:landlord").as_bytes());
    }

    #[actix_web::test]
    async fn missing_caller_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("not-a-uuid", "tenant")]
    #[case(FIXTURE_ID, "guest")]
    #[actix_web::test]
    async fn tampered_values_are_unauthorised(#[case] user: &str, #[case] role: &str) {
        let app = test::init_service(session_test_app()).await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/set-raw/{user}/{role}"))
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
