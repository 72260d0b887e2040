//! Session and account handlers.
//!
//! ```text
//! POST /api/v1/register {"email":"ada@example.org","password":"analytical",
//!                         "firstName":"Ada","lastName":"Byron"}
//! POST /api/v1/login {"email":"admin@example.org","password":"password"}
//! POST /api/v1/logout
//! GET  /api/v1/users?page=1
//! GET  /api/v1/users/me
//! PUT  /api/v1/users/me {"firstName":"Grace","lastName":"Hopper"}
//! PUT  /api/v1/users/me/password {"password":"analytical"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Action, Error, LoginCredentials, LoginValidationError, NewPassword, Page, Registration,
    ResourceKind, User, UserProfile, authorize,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PageResponse, UserSchema};
use crate::inbound::http::session::{SessionContext, stale_session};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account e-mail.
    #[schema(example = "admin@example.org")]
    pub email: String,
    /// Account password.
    #[schema(example = "password")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Profile edit body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    /// Given name, 3 to 16 characters.
    #[schema(example = "Grace")]
    pub first_name: String,
    /// Family name, 3 to 32 characters.
    #[schema(example = "Hopper")]
    pub last_name: String,
}

/// Self-registration body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Login e-mail, at most 180 characters.
    #[schema(example = "ada@example.org")]
    pub email: String,
    /// Password, 6 to 191 characters.
    #[schema(example = "analytical")]
    pub password: String,
    /// Given name, 3 to 16 characters.
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name, 3 to 32 characters.
    #[schema(example = "Byron")]
    pub last_name: String,
}

/// Password change body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    /// New password, 6 to 191 characters.
    #[schema(example = "analytical")]
    pub password: String,
}

/// Create a reader account. The caller is not logged in afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "E-mail already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let RegistrationRequest {
        email,
        password,
        first_name,
        last_name,
    } = payload.into_inner();
    let registration = Registration::new(&email, &password, &first_name, &last_name)?;
    let user = state.users.register(registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    Ok(web::Json(user))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// List every account. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Accounts", body = PageResponse<UserSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<User>>> {
    authorize(Action::Index, ResourceKind::UserData, &session.actor()?)?;
    let page: Page<User> = state.users.list(query.into_inner().to_request()?).await?;
    Ok(web::Json(PageResponse::from_page(page, |user| user)))
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current account", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    authorize(Action::View, ResourceKind::UserData, &session.actor()?)?;
    Ok(web::Json(session.require_user(state.users.as_ref()).await?))
}

/// Replace the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<User>> {
    authorize(Action::Edit, ResourceKind::UserData, &session.actor()?)?;
    let user_id = session.require_user_id()?;
    let ProfileRequest {
        first_name,
        last_name,
    } = payload.into_inner();
    let profile = UserProfile::new(&first_name, &last_name)?;
    let user = state
        .users
        .update_profile(user_id, profile)
        .await
        .map_err(stale_session)?;
    Ok(web::Json(user))
}

/// Replace the caller's password.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[put("/users/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Edit, ResourceKind::UserData, &session.actor()?)?;
    let user_id = session.require_user_id()?;
    let password = NewPassword::new(&payload.password)?;
    state
        .users
        .change_password(user_id, password)
        .await
        .map_err(stale_session)?;
    Ok(HttpResponse::NoContent().finish())
}
