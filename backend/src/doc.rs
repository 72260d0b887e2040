//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: documentation wrappers from
//!   [`crate::inbound::http::schemas`] plus the request bodies
//! - **Security**: session cookie authentication scheme
//!
//! The generated specification is served by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::authors::AuthorRequest;
use crate::inbound::http::categories::CategoryRequest;
use crate::inbound::http::elements::ElementRequest;
use crate::inbound::http::reservations::{CommentRequest, ReservationRequest};
use crate::inbound::http::schemas::{
    AuthorSchema, CategorySchema, ElementSchema, ErrorCodeSchema, ErrorSchema,
    LendingOutcomeSchema, ProfileSchema, RequesterSchema, ReservationSchema,
    ReservationStatusSchema, TagSchema, UserSchema,
};
use crate::inbound::http::tags::TagRequest;
use crate::inbound::http::users::{
    LoginRequest, PasswordRequest, ProfileRequest, RegistrationRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lending library API",
        description = "Catalogue browsing, reservations, and session-authenticated administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::list_category_elements,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::tags::list_tags,
        crate::inbound::http::tags::get_tag,
        crate::inbound::http::tags::create_tag,
        crate::inbound::http::tags::update_tag,
        crate::inbound::http::tags::delete_tag,
        crate::inbound::http::authors::list_authors,
        crate::inbound::http::authors::get_author,
        crate::inbound::http::authors::create_author,
        crate::inbound::http::authors::update_author,
        crate::inbound::http::authors::delete_author,
        crate::inbound::http::elements::list_elements,
        crate::inbound::http::elements::get_element,
        crate::inbound::http::elements::create_element,
        crate::inbound::http::elements::update_element,
        crate::inbound::http::elements::delete_element,
        crate::inbound::http::reservations::list_reservations,
        crate::inbound::http::reservations::list_own_reservations,
        crate::inbound::http::reservations::create_reservation,
        crate::inbound::http::reservations::get_reservation,
        crate::inbound::http::reservations::update_reservation,
        crate::inbound::http::reservations::delete_reservation,
        crate::inbound::http::reservations::accept_reservation,
        crate::inbound::http::reservations::return_reservation,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        ProfileSchema,
        CategorySchema,
        TagSchema,
        AuthorSchema,
        ElementSchema,
        ReservationSchema,
        ReservationStatusSchema,
        RequesterSchema,
        LendingOutcomeSchema,
        RegistrationRequest,
        LoginRequest,
        ProfileRequest,
        PasswordRequest,
        CategoryRequest,
        TagRequest,
        AuthorRequest,
        ElementRequest,
        ReservationRequest,
        CommentRequest,
    )),
    tags(
        (name = "users", description = "Sessions and accounts"),
        (name = "categories", description = "Catalogue categories"),
        (name = "tags", description = "Catalogue tags"),
        (name = "authors", description = "Catalogue authors"),
        (name = "elements", description = "Borrowable items and their stock"),
        (name = "reservations", description = "Reservation workflow"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
