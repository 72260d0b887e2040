//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie carries the authenticated user id and the roles granted
//! at login. Handlers turn it into an [`Actor`] and hand that to the policy.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::UserAccounts;
use crate::domain::{Actor, Error, ErrorCode, Role, User, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLES_KEY: &str = "roles";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated account in the session cookie.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        let roles: Vec<&str> = user.roles.iter().map(|role| role.as_str()).collect();
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.id.to_string())
            .and_then(|()| self.0.insert(ROLES_KEY, roles))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// The caller as seen by the access policy.
    ///
    /// A missing or tampered session yields [`Actor::Anonymous`].
    pub fn actor(&self) -> Result<Actor, Error> {
        let Some(user_id) = self.user_id()? else {
            return Ok(Actor::Anonymous);
        };
        let raw_roles = self
            .0
            .get::<Vec<String>>(ROLES_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
            .unwrap_or_default();
        let mut roles = Vec::with_capacity(raw_roles.len());
        for raw in raw_roles {
            match raw.parse::<Role>() {
                Ok(role) => roles.push(role),
                Err(error) => {
                    warn!(%error, role = %raw, "unknown role in session cookie");
                    return Ok(Actor::Anonymous);
                }
            }
        }
        Ok(Actor::authenticated(user_id, roles))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!(%error, "invalid user id in session cookie");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Load the account behind the session.
    ///
    /// A session whose account has since disappeared is treated like no
    /// session at all.
    pub async fn require_user(&self, users: &dyn UserAccounts) -> Result<User, Error> {
        let user_id = self.require_user_id()?;
        users.get(user_id).await.map_err(stale_session)
    }
}

/// Turn "account not found" for the session's own user into `401`.
pub(crate) fn stale_session(error: Error) -> Error {
    if error.code() == ErrorCode::NotFound {
        warn!("session refers to a missing account");
        Error::unauthorized("session account no longer exists")
    } else {
        error
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
    use std::sync::Arc;

    use crate::domain::EmailAddress;
    use crate::domain::ports::MockUserAccounts;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const ADMIN_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn admin() -> User {
        User {
            id: UserId::new(ADMIN_ID).expect("fixture id"),
            email: EmailAddress::new("admin@example.org", "email").expect("email"),
            roles: vec![Role::Admin],
            profile: None,
        }
    }

    async fn describe_actor(session: SessionContext) -> Result<HttpResponse, Error> {
        let body = match session.actor()? {
            Actor::Anonymous => "anonymous".to_owned(),
            Actor::Authenticated { user_id, roles } => {
                let roles: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
                format!("{user_id} {}", roles.join(","))
            }
        };
        Ok(HttpResponse::Ok().body(body))
    }

    async fn describe_account(
        session: SessionContext,
        users: web::Data<Arc<dyn UserAccounts>>,
    ) -> Result<HttpResponse, Error> {
        let user = session.require_user(users.get_ref().as_ref()).await?;
        Ok(HttpResponse::Ok().body(user.id.to_string()))
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn round_trips_the_actor() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&admin())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/whoami", web::get().to(describe_actor)),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&login);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(body, format!("{ADMIN_ID} ROLE_ADMIN").as_str());
    }

    #[actix_web::test]
    async fn unknown_roles_degrade_to_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/tamper",
                    web::get().to(|session: Session| async move {
                        session.insert(USER_ID_KEY, ADMIN_ID).expect("set id");
                        session
                            .insert(ROLES_KEY, vec!["ROLE_ROOT"])
                            .expect("set roles");
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(describe_actor)),
        )
        .await;

        let tamper =
            test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&tamper);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, "anonymous");
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/require",
                    web::get().to(|session: SessionContext| async move {
                        let _ = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn vanished_accounts_end_the_session() {
        let mut users = MockUserAccounts::new();
        users
            .expect_get()
            .return_once(|id| Err(Error::not_found(format!("user {id} not found"))));
        let users: Arc<dyn UserAccounts> = Arc::new(users);
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .app_data(web::Data::new(users))
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&admin())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/me", web::get().to(describe_account)),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&login);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest::rstest]
    #[case(Error::not_found("user gone"), ErrorCode::Unauthorized)]
    #[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
    #[actix_web::test]
    async fn only_missing_accounts_become_unauthorised(#[case] error: Error, #[case] code: ErrorCode) {
        assert_eq!(stale_session(error).code(), code);
    }
}
