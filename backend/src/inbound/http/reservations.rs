//! Reservation handlers.
//!
//! ```text
//! POST /api/v1/reservations {"elementId":"…","comment":"for my thesis"}
//! POST /api/v1/reservations/{id}/accept
//! POST /api/v1/reservations/{id}/return
//! ```
//!
//! Any signed-in account may request an element and see its own requests.
//! Everything else is gated by the access policy.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::LendingOutcome;
use crate::domain::{
    Action, ElementId, Error, Requester, Reservation, ReservationDraft, ReservationId,
    ResourceKind, User, authorize,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, LendingOutcomeSchema, PageResponse, ReservationSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_id};

const ID: FieldName = FieldName::new("id");

/// Reservation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Element to reserve.
    #[schema(format = Uuid)]
    pub element_id: String,
    /// Note for the administrators, 1 to 255 characters.
    #[schema(example = "Needed for my thesis")]
    pub comment: String,
    /// Display name; defaults to the account's first name.
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Comment edit body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommentRequest {
    /// Replacement comment, 1 to 255 characters.
    pub comment: String,
}

fn nickname_for(user: &User, requested: Option<&str>) -> String {
    if let Some(nickname) = requested {
        return nickname.to_owned();
    }
    match &user.profile {
        Some(profile) => profile.first_name().to_owned(),
        None => user
            .email
            .as_str()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_owned(),
    }
}

impl ReservationRequest {
    fn draft(&self, user: &User) -> Result<ReservationDraft, Error> {
        let element_id: ElementId = parse_id(&self.element_id, FieldName::new("elementId"))?;
        let nickname = nickname_for(user, self.nickname.as_deref());
        let requester = Requester::new(user.email.as_str(), &nickname, Some(user.id))?;
        Ok(ReservationDraft::new(element_id, requester, &self.comment)?)
    }
}

/// List every reservation, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    params(PageQuery),
    responses(
        (status = 200, description = "Reservations", body = PageResponse<ReservationSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listReservations"
)]
#[get("/reservations")]
pub async fn list_reservations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<Reservation>>> {
    authorize(Action::View, ResourceKind::Reservation, &session.actor()?)?;
    let page = state
        .reservations_query
        .list(query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, |entry| entry)))
}

/// Reservations made by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/mine",
    params(PageQuery),
    responses(
        (status = 200, description = "Own reservations", body = PageResponse<ReservationSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listOwnReservations"
)]
#[get("/reservations/mine")]
pub async fn list_own_reservations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<Reservation>>> {
    let user_id = session.require_user_id()?;
    let page = state
        .reservations_query
        .list_for_user(user_id, query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, |entry| entry)))
}

/// Request an element. Stock is untouched until an administrator accepts.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Created", body = ReservationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Element not found", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "createReservation"
)]
#[post("/reservations")]
pub async fn create_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReservationRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user(state.users.as_ref()).await?;
    let created = state.reservations.create(payload.draft(&user)?).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Fetch one reservation.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    params(("id" = String, Path, description = "Reservation identifier")),
    responses(
        (status = 200, description = "Reservation", body = ReservationSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "getReservation"
)]
#[get("/reservations/{id}")]
pub async fn get_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Reservation>> {
    authorize(Action::View, ResourceKind::Reservation, &session.actor()?)?;
    let id: ReservationId = parse_id(&path, ID)?;
    Ok(web::Json(state.reservations_query.get(id).await?))
}

/// Replace a reservation's comment.
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}",
    params(("id" = String, Path, description = "Reservation identifier")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated", body = ReservationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "updateReservation"
)]
#[put("/reservations/{id}")]
pub async fn update_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<Reservation>> {
    authorize(Action::Edit, ResourceKind::Reservation, &session.actor()?)?;
    let id: ReservationId = parse_id(&path, ID)?;
    let CommentRequest { comment } = payload.into_inner();
    Ok(web::Json(state.reservations.update_comment(id, comment).await?))
}

/// Delete a reservation record.
#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    params(("id" = String, Path, description = "Reservation identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "deleteReservation"
)]
#[delete("/reservations/{id}")]
pub async fn delete_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(Action::Delete, ResourceKind::Reservation, &session.actor()?)?;
    let id: ReservationId = parse_id(&path, ID)?;
    state.reservations.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Accept a new reservation, taking one unit of stock when available.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/accept",
    params(("id" = String, Path, description = "Reservation identifier")),
    responses(
        (status = 200, description = "Accepted or out of stock", body = LendingOutcomeSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Reservation is not new", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "acceptReservation"
)]
#[post("/reservations/{id}/accept")]
pub async fn accept_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LendingOutcome>> {
    authorize(Action::Accept, ResourceKind::Reservation, &session.actor()?)?;
    let id: ReservationId = parse_id(&path, ID)?;
    Ok(web::Json(state.reservations.accept(id).await?))
}

/// Mark an accepted reservation returned, restoring one unit of stock.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/return",
    params(("id" = String, Path, description = "Reservation identifier")),
    responses(
        (status = 200, description = "Returned", body = LendingOutcomeSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Reservation is not accepted", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "returnReservation"
)]
#[post("/reservations/{id}/return")]
pub async fn return_reservation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LendingOutcome>> {
    authorize(Action::Return, ResourceKind::Reservation, &session.actor()?)?;
    let id: ReservationId = parse_id(&path, ID)?;
    Ok(web::Json(state.reservations.return_reservation(id).await?))
}
