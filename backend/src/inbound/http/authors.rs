//! Author handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Action, Author, AuthorDraft, AuthorId, ResourceKind, authorize};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AuthorSchema, ErrorSchema, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_id};

const ID: FieldName = FieldName::new("id");

/// Author create and update body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AuthorRequest {
    /// Given name, 3 to 16 characters.
    #[schema(example = "Ursula")]
    pub name: String,
    /// Surname, 3 to 32 characters.
    #[schema(example = "Le Guin")]
    pub surname: String,
}

impl AuthorRequest {
    fn draft(&self) -> Result<AuthorDraft, crate::domain::Error> {
        Ok(AuthorDraft::new(&self.name, &self.surname)?)
    }
}

/// List authors.
#[utoipa::path(
    get,
    path = "/api/v1/authors",
    params(PageQuery),
    responses(
        (status = 200, description = "Authors", body = PageResponse<AuthorSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "listAuthors",
    security([])
)]
#[get("/authors")]
pub async fn list_authors(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<Author>>> {
    let page = state.authors.list(query.into_inner().to_request()?).await?;
    Ok(web::Json(PageResponse::from_page(page, |author| author)))
}

/// Fetch one author.
#[utoipa::path(
    get,
    path = "/api/v1/authors/{id}",
    params(("id" = String, Path, description = "Author identifier")),
    responses(
        (status = 200, description = "Author", body = AuthorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "getAuthor",
    security([])
)]
#[get("/authors/{id}")]
pub async fn get_author(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Author>> {
    let id: AuthorId = parse_id(&path, ID)?;
    Ok(web::Json(state.authors.get(id).await?))
}

/// Create an author.
#[utoipa::path(
    post,
    path = "/api/v1/authors",
    request_body = AuthorRequest,
    responses(
        (status = 201, description = "Created", body = AuthorSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "createAuthor"
)]
#[post("/authors")]
pub async fn create_author(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AuthorRequest>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Create, ResourceKind::Author, &session.actor()?)?;
    let created = state.authors.create(payload.draft()?).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Replace an author's names.
#[utoipa::path(
    put,
    path = "/api/v1/authors/{id}",
    params(("id" = String, Path, description = "Author identifier")),
    request_body = AuthorRequest,
    responses(
        (status = 200, description = "Updated", body = AuthorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "updateAuthor"
)]
#[put("/authors/{id}")]
pub async fn update_author(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AuthorRequest>,
) -> ApiResult<web::Json<Author>> {
    authorize(Action::Edit, ResourceKind::Author, &session.actor()?)?;
    let id: AuthorId = parse_id(&path, ID)?;
    Ok(web::Json(state.authors.update(id, payload.draft()?).await?))
}

/// Delete an author, removing their credits.
#[utoipa::path(
    delete,
    path = "/api/v1/authors/{id}",
    params(("id" = String, Path, description = "Author identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "deleteAuthor"
)]
#[delete("/authors/{id}")]
pub async fn delete_author(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Delete, ResourceKind::Author, &session.actor()?)?;
    let id: AuthorId = parse_id(&path, ID)?;
    state.authors.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{
        ADMIN_EMAIL, login_request, memory_state, session_cookie, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn created_authors_are_listed_with_their_slug() {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(ADMIN_EMAIL).to_request()).await;

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/authors")
                .cookie(session_cookie(&login))
                .set_json(json!({ "name": "Ursula", "surname": "Le Guin" }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/authors").to_request(),
        )
        .await;
        let page: Value = serde_json::from_slice(&test::read_body(listed).await).expect("JSON");
        assert_eq!(page["total"], 1);
        assert_eq!(page["items"][0]["slug"], "ursula-le-guin");
    }

    #[rstest]
    #[case(json!({ "name": "Al", "surname": "Valid" }), "name")]
    #[case(json!({ "name": "Valid", "surname": "" }), "surname")]
    #[actix_web::test]
    async fn names_are_validated(#[case] body: Value, #[case] field: &str) {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(ADMIN_EMAIL).to_request()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/authors")
                .cookie(session_cookie(&login))
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&test::read_body(res).await).expect("JSON");
        assert_eq!(value["details"]["field"], field);
    }
}
