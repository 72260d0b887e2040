//! Element handlers.
//!
//! ```text
//! GET  /api/v1/elements?categoryId=…&tagId=…&page=2
//! POST /api/v1/elements {"title":"Solaris","description":"…","stock":2,
//!                        "categoryId":"…","tagIds":["…"],"authorIds":[]}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::{
    Action, AuthorId, CategoryId, Element, ElementDraft, ElementFilter, ElementId, ElementInput,
    Error, ResourceKind, TagId, authorize,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ElementSchema, ErrorSchema, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, PageQuery, parse_id, parse_id_list, parse_optional_id,
};

const ID: FieldName = FieldName::new("id");

/// Element list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ElementsQuery {
    /// Page number, starting at 1.
    #[param(minimum = 1)]
    pub page: Option<u32>,
    /// Only elements in this category.
    pub category_id: Option<String>,
    /// Only elements carrying this tag.
    pub tag_id: Option<String>,
}

impl ElementsQuery {
    fn filter(&self) -> Result<ElementFilter, Error> {
        Ok(ElementFilter {
            category_id: parse_optional_id::<CategoryId>(
                self.category_id.as_deref(),
                FieldName::new("categoryId"),
            )?,
            tag_id: parse_optional_id::<TagId>(self.tag_id.as_deref(), FieldName::new("tagId"))?,
            author_id: None,
        })
    }
}

/// Element create and update body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementRequest {
    /// Title, 3 to 255 characters.
    #[schema(example = "The Dispossessed")]
    pub title: String,
    /// Description, 3 to 255 characters.
    #[schema(example = "An ambiguous utopia")]
    pub description: String,
    /// Units available to lend.
    #[serde(default)]
    #[schema(minimum = 0, example = 2)]
    pub stock: u32,
    /// Owning category.
    #[schema(format = Uuid)]
    pub category_id: Option<String>,
    /// Tags to attach.
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// Authors to credit.
    #[serde(default)]
    pub author_ids: Vec<String>,
}

impl ElementRequest {
    fn draft(&self) -> Result<ElementDraft, Error> {
        let category_id = parse_optional_id::<CategoryId>(
            self.category_id.as_deref(),
            FieldName::new("categoryId"),
        )?;
        let tag_ids: Vec<TagId> = parse_id_list(&self.tag_ids, FieldName::new("tagIds"))?;
        let author_ids: Vec<AuthorId> =
            parse_id_list(&self.author_ids, FieldName::new("authorIds"))?;
        Ok(ElementDraft::new(ElementInput {
            title: &self.title,
            description: &self.description,
            stock: self.stock,
            category_id,
            tag_ids,
            author_ids,
        })?)
    }
}

/// List elements, optionally filtered by category or tag.
#[utoipa::path(
    get,
    path = "/api/v1/elements",
    params(ElementsQuery),
    responses(
        (status = 200, description = "Elements", body = PageResponse<ElementSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["elements"],
    operation_id = "listElements",
    security([])
)]
#[get("/elements")]
pub async fn list_elements(
    state: web::Data<HttpState>,
    query: web::Query<ElementsQuery>,
) -> ApiResult<web::Json<PageResponse<Element>>> {
    let filter = query.filter()?;
    let page = PageQuery { page: query.page }.to_request()?;
    let elements = state.elements.list(filter, page).await?;
    Ok(web::Json(PageResponse::from_page(elements, |element| element)))
}

/// Fetch one element.
#[utoipa::path(
    get,
    path = "/api/v1/elements/{id}",
    params(("id" = String, Path, description = "Element identifier")),
    responses(
        (status = 200, description = "Element", body = ElementSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["elements"],
    operation_id = "getElement",
    security([])
)]
#[get("/elements/{id}")]
pub async fn get_element(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Element>> {
    let id: ElementId = parse_id(&path, ID)?;
    Ok(web::Json(state.elements.get(id).await?))
}

/// Create an element.
#[utoipa::path(
    post,
    path = "/api/v1/elements",
    request_body = ElementRequest,
    responses(
        (status = 201, description = "Created", body = ElementSchema),
        (status = 400, description = "Invalid request or unknown reference", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["elements"],
    operation_id = "createElement"
)]
#[post("/elements")]
pub async fn create_element(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ElementRequest>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Create, ResourceKind::Element, &session.actor()?)?;
    let created = state.elements.create(payload.draft()?).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Replace an element's fields, stock included.
#[utoipa::path(
    put,
    path = "/api/v1/elements/{id}",
    params(("id" = String, Path, description = "Element identifier")),
    request_body = ElementRequest,
    responses(
        (status = 200, description = "Updated", body = ElementSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["elements"],
    operation_id = "updateElement"
)]
#[put("/elements/{id}")]
pub async fn update_element(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ElementRequest>,
) -> ApiResult<web::Json<Element>> {
    authorize(Action::Edit, ResourceKind::Element, &session.actor()?)?;
    let id: ElementId = parse_id(&path, ID)?;
    Ok(web::Json(state.elements.update(id, payload.draft()?).await?))
}

/// Delete an element with no reservations.
#[utoipa::path(
    delete,
    path = "/api/v1/elements/{id}",
    params(("id" = String, Path, description = "Element identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Element has reservations", body = ErrorSchema)
    ),
    tags = ["elements"],
    operation_id = "deleteElement"
)]
#[delete("/elements/{id}")]
pub async fn delete_element(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Delete, ResourceKind::Element, &session.actor()?)?;
    let id: ElementId = parse_id(&path, ID)?;
    state.elements.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::MockElementCatalogue;
    use crate::domain::Page;
    use crate::inbound::http::test_utils::{
        ADMIN_EMAIL, login_request, memory_state, session_cookie, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    const CATEGORY: &str = "6d3a4bd4-0a9c-4a52-9a55-0b1a4f2b6c11";
    const TAG: &str = "0f0e1f7c-5f44-4b0a-8c59-2a8b7c1e9d22";

    #[actix_web::test]
    async fn list_filters_are_parsed_and_forwarded() {
        let mut elements = MockElementCatalogue::new();
        elements
            .expect_list()
            .withf(|filter, page| {
                filter.category_id.map(|id| id.to_string()).as_deref() == Some(CATEGORY)
                    && filter.tag_id.map(|id| id.to_string()).as_deref() == Some(TAG)
                    && page.page() == 2
            })
            .times(1)
            .returning(|_, page| Ok(Page::new(Vec::new(), page, 11)));
        let (_, mut state) = memory_state();
        state.elements = Arc::new(elements);
        let app = test::init_service(test_app(state)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/elements?categoryId={CATEGORY}&tagId={TAG}&page=2"
                ))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = serde_json::from_slice(&test::read_body(res).await).expect("JSON");
        assert_eq!(value["totalPages"], 2);
        assert_eq!(value["page"], 2);
    }

    #[rstest]
    #[case("/api/v1/elements?tagId=nope", "tagId")]
    #[case("/api/v1/elements?page=0", "page")]
    #[actix_web::test]
    async fn malformed_filters_are_rejected(#[case] uri: &str, #[case] field: &str) {
        let mut elements = MockElementCatalogue::new();
        elements.expect_list().never();
        let (_, mut state) = memory_state();
        state.elements = Arc::new(elements);
        let app = test::init_service(test_app(state)).await;

        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&test::read_body(res).await).expect("JSON");
        assert_eq!(value["details"]["field"], field);
    }

    #[actix_web::test]
    async fn unknown_categories_are_rejected_on_create() {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(ADMIN_EMAIL).to_request()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/elements")
                .cookie(session_cookie(&login))
                .set_json(json!({
                    "title": "Kindred",
                    "description": "Time travel novel",
                    "stock": 1,
                    "categoryId": CATEGORY,
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&test::read_body(res).await).expect("JSON");
        assert_eq!(value["details"]["code"], "unknown_reference");
        assert_eq!(value["details"]["field"], "categoryId");
    }

    #[actix_web::test]
    async fn anonymous_callers_cannot_create() {
        let mut elements = MockElementCatalogue::new();
        elements.expect_create().never();
        let (_, mut state) = memory_state();
        state.elements = Arc::new(elements);
        let app = test::init_service(test_app(state)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/elements")
                .set_json(json!({
                    "title": "Kindred",
                    "description": "Time travel novel",
                    "categoryId": CATEGORY,
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn request_without_category_is_invalid() {
        let request = ElementRequest {
            title: "Kindred".to_owned(),
            description: "Time travel novel".to_owned(),
            stock: 1,
            category_id: None,
            tag_ids: Vec::new(),
            author_ids: Vec::new(),
        };
        let error = request.draft().expect_err("category required");
        assert_eq!(error.details().expect("details")["field"], "categoryId");
    }
}
