//! Tag handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Action, ResourceKind, Tag, TagDraft, TagId, authorize};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PageResponse, TagSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_id};

const ID: FieldName = FieldName::new("id");

/// Tag create and update body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TagRequest {
    /// Title, 3 to 16 characters.
    #[schema(example = "classic")]
    pub title: String,
}

/// List tags.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    params(PageQuery),
    responses(
        (status = 200, description = "Tags", body = PageResponse<TagSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags",
    security([])
)]
#[get("/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<Tag>>> {
    let page = state.tags.list(query.into_inner().to_request()?).await?;
    Ok(web::Json(PageResponse::from_page(page, |tag| tag)))
}

/// Fetch one tag.
#[utoipa::path(
    get,
    path = "/api/v1/tags/{id}",
    params(("id" = String, Path, description = "Tag identifier")),
    responses(
        (status = 200, description = "Tag", body = TagSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "getTag",
    security([])
)]
#[get("/tags/{id}")]
pub async fn get_tag(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Tag>> {
    let id: TagId = parse_id(&path, ID)?;
    Ok(web::Json(state.tags.get(id).await?))
}

/// Create a tag.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Created", body = TagSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "createTag"
)]
#[post("/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TagRequest>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Create, ResourceKind::Tag, &session.actor()?)?;
    let created = state.tags.create(TagDraft::new(&payload.title)?).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Rename a tag.
#[utoipa::path(
    put,
    path = "/api/v1/tags/{id}",
    params(("id" = String, Path, description = "Tag identifier")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Updated", body = TagSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "updateTag"
)]
#[put("/tags/{id}")]
pub async fn update_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TagRequest>,
) -> ApiResult<web::Json<Tag>> {
    authorize(Action::Edit, ResourceKind::Tag, &session.actor()?)?;
    let id: TagId = parse_id(&path, ID)?;
    let draft = TagDraft::new(&payload.title)?;
    Ok(web::Json(state.tags.update(id, draft).await?))
}

/// Delete a tag, detaching it from its elements.
#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    params(("id" = String, Path, description = "Tag identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "deleteTag"
)]
#[delete("/tags/{id}")]
pub async fn delete_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Delete, ResourceKind::Tag, &session.actor()?)?;
    let id: TagId = parse_id(&path, ID)?;
    state.tags.delete(id).await?;
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
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn administrators_maintain_tags() {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(ADMIN_EMAIL).to_request()).await;
        let cookie = session_cookie(&login);

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/tags")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Space Opera" }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let tag: Value = serde_json::from_slice(&test::read_body(created).await).expect("JSON");
        let id = tag["id"].as_str().expect("id").to_owned();

        let renamed = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/tags/{id}"))
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Hard SF" }))
                .to_request(),
        )
        .await;
        let renamed: Value = serde_json::from_slice(&test::read_body(renamed).await).expect("JSON");
        assert_eq!(renamed["slug"], "hard-sf");

        let deleted = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/tags/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/tags/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn readers_cannot_delete_tags() {
        let (_, state) = memory_state();
        let app = test::init_service(test_app(state)).await;
        let login = test::call_service(&app, login_request(READER_EMAIL).to_request()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/v1/tags/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .cookie(session_cookie(&login))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
