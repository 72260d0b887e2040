//! Category handlers.
//!
//! Browsing is public; every mutation goes through the access policy.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Action, Category, CategoryDraft, CategoryId, Element, ResourceKind, authorize};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CategorySchema, ElementSchema, ErrorSchema, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_id};

const ID: FieldName = FieldName::new("id");

/// Category create and update body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CategoryRequest {
    /// Title, 3 to 16 characters.
    #[schema(example = "Novels")]
    pub title: String,
}

/// List categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(PageQuery),
    responses(
        (status = 200, description = "Categories", body = PageResponse<CategorySchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<Category>>> {
    let page = state
        .categories
        .list(query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, |entry| entry)))
}

/// Fetch one category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "Category", body = CategorySchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "getCategory",
    security([])
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Category>> {
    let id: CategoryId = parse_id(&path, ID)?;
    Ok(web::Json(state.categories.get(id).await?))
}

/// Elements filed under a category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/elements",
    params(("id" = String, Path, description = "Category identifier"), PageQuery),
    responses(
        (status = 200, description = "Elements", body = PageResponse<ElementSchema>),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "listCategoryElements",
    security([])
)]
#[get("/categories/{id}/elements")]
pub async fn list_category_elements(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<Element>>> {
    let id: CategoryId = parse_id(&path, ID)?;
    let page = state
        .categories
        .elements(id, query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, |element| element)))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Created", body = CategorySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Create, ResourceKind::Category, &session.actor()?)?;
    let draft = CategoryDraft::new(&payload.title)?;
    let created = state.categories.create(draft).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Rename a category.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated", body = CategorySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<web::Json<Category>> {
    authorize(Action::Edit, ResourceKind::Category, &session.actor()?)?;
    let id: CategoryId = parse_id(&path, ID)?;
    let draft = CategoryDraft::new(&payload.title)?;
    Ok(web::Json(state.categories.update(id, draft).await?))
}

/// Delete a category with no elements.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Category still has elements", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Delete, ResourceKind::Category, &session.actor()?)?;
    let id: CategoryId = parse_id(&path, ID)?;
    state.categories.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{
        ADMIN_EMAIL, READER_EMAIL, login_request, memory_state, session_cookie, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn json_body(res: actix_web::dev::ServiceResponse) -> Value {
        serde_json::from_slice(&test::read_body(res).await).expect("JSON body")
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some(READER_EMAIL), StatusCode::FORBIDDEN)]
    #[case(Some(ADMIN_EMAIL), StatusCode::CREATED)]
    #[actix_web::test]
    async fn creating_needs_an_administrator(
        #[case] email: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let mut request = test::TestRequest::post()
            .uri("/api/v1/categories")
            .set_json(json!({ "title": "Poetry" }));
        if let Some(email) = email {
            let login = test::call_service(&app, login_request(email).to_request()).await;
            request = request.cookie(session_cookie(&login));
        }

        let res = test::call_service(&app, request.to_request()).await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn browsing_is_public_and_deletion_is_guarded() {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(ADMIN_EMAIL).to_request()).await;
        let cookie = session_cookie(&login);

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/categories")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Science Fiction" }))
                .to_request(),
        )
        .await;
        let category = json_body(created).await;
        assert_eq!(category["slug"], "science-fiction");
        let id = category["id"].as_str().expect("id").to_owned();

        let element = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/elements")
                .cookie(cookie.clone())
                .set_json(json!({
                    "title": "Solaris",
                    "description": "Ocean planet",
                    "stock": 1,
                    "categoryId": id,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(element.status(), StatusCode::CREATED);

        let listed = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/categories/{id}/elements"))
                .to_request(),
        )
        .await;
        assert_eq!(listed.status(), StatusCode::OK);
        assert_eq!(json_body(listed).await["items"][0]["title"], "Solaris");

        let refused = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/categories/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(refused.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(refused).await["details"]["code"], "in_use");
    }

    #[rstest]
    #[case("not-a-uuid", StatusCode::BAD_REQUEST)]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn unknown_ids_are_reported(#[case] id: &str, #[case] expected: StatusCode) {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/categories/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn titles_are_validated() {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(ADMIN_EMAIL).to_request()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/categories")
                .cookie(session_cookie(&login))
                .set_json(json!({ "title": "A title that is far too long" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value = json_body(res).await;
        assert_eq!(value["details"]["field"], "title");
        assert_eq!(value["details"]["code"], "too_long");
    }
}
