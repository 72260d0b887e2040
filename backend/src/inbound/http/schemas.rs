//! OpenAPI schema definitions shared by every endpoint.
//!
//! Domain types stay free of `ToSchema`; the wrappers here mirror their wire
//! shape for documentation only.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Page;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the resource's current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "cannot accept a reservation that is returned")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary machine-readable details.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = User, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Login e-mail.
    #[schema(example = "reader@example.org")]
    email: String,
    /// Granted roles.
    #[schema(example = json!(["ROLE_USER"]))]
    roles: Vec<String>,
    /// Personal details, once provided.
    profile: Option<ProfileSchema>,
}

/// OpenAPI schema for [`crate::domain::UserProfile`].
#[derive(ToSchema)]
#[schema(as = UserProfile, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ProfileSchema {
    /// Given name, 3 to 16 characters.
    #[schema(example = "Grace")]
    first_name: String,
    /// Family name, 3 to 32 characters.
    #[schema(example = "Hopper")]
    last_name: String,
}

/// OpenAPI schema for [`crate::domain::Category`].
#[derive(ToSchema)]
#[schema(as = Category, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CategorySchema {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    id: String,
    /// Title, 3 to 16 characters.
    #[schema(example = "Novels")]
    title: String,
    /// Slug derived from the title.
    #[schema(example = "novels")]
    slug: String,
    /// Creation timestamp.
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    /// Last modification timestamp.
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::Tag`].
#[derive(ToSchema)]
#[schema(as = Tag)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct TagSchema {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    id: String,
    /// Title, 3 to 16 characters.
    #[schema(example = "classic")]
    title: String,
    /// Slug derived from the title.
    #[schema(example = "classic")]
    slug: String,
}

/// OpenAPI schema for [`crate::domain::Author`].
#[derive(ToSchema)]
#[schema(as = Author)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct AuthorSchema {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    id: String,
    /// Given name, 3 to 16 characters.
    #[schema(example = "Ursula")]
    name: String,
    /// Surname, 3 to 32 characters.
    #[schema(example = "Le Guin")]
    surname: String,
    /// Slug derived from the full name.
    #[schema(example = "ursula-le-guin")]
    slug: String,
}

/// OpenAPI schema for [`crate::domain::Element`].
#[derive(ToSchema)]
#[schema(as = Element, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ElementSchema {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    id: String,
    /// Title, 3 to 255 characters.
    #[schema(example = "The Dispossessed")]
    title: String,
    /// Description, 3 to 255 characters.
    description: String,
    /// Units available to lend.
    #[schema(minimum = 0, example = 2)]
    stock: u32,
    /// Owning category.
    #[schema(value_type = String, format = Uuid)]
    category_id: String,
    /// Attached tags.
    #[schema(value_type = Vec<String>)]
    tag_ids: Vec<String>,
    /// Credited authors.
    #[schema(value_type = Vec<String>)]
    author_ids: Vec<String>,
    /// Slug derived from the title.
    slug: String,
    /// Creation timestamp.
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ReservationStatus`].
#[derive(ToSchema)]
#[schema(as = ReservationStatus)]
pub enum ReservationStatusSchema {
    /// Awaiting an administrator.
    #[schema(rename = "new")]
    New,
    /// Holds one unit of stock.
    #[schema(rename = "accepted")]
    Accepted,
    /// Accept found no stock left.
    #[schema(rename = "out_of_stock")]
    OutOfStock,
    /// The unit has been given back.
    #[schema(rename = "returned")]
    Returned,
}

/// OpenAPI schema for [`crate::domain::Requester`].
#[derive(ToSchema)]
#[schema(as = Requester, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RequesterSchema {
    /// Contact e-mail.
    #[schema(example = "reader@example.org")]
    email: String,
    /// Display nickname.
    #[schema(example = "Grace")]
    nickname: String,
    /// Account that placed the request, if any.
    #[schema(value_type = Option<String>, format = Uuid)]
    user_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Reservation`].
#[derive(ToSchema)]
#[schema(as = Reservation, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ReservationSchema {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    id: String,
    /// Reserved element.
    #[schema(value_type = String, format = Uuid)]
    element_id: String,
    /// Lifecycle status.
    status: ReservationStatusSchema,
    /// Who asked.
    requester: RequesterSchema,
    /// Requester comment, 1 to 255 characters.
    comment: String,
    /// Creation timestamp.
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    /// Last modification timestamp.
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::LendingOutcome`].
#[derive(ToSchema)]
#[schema(as = LendingOutcome)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct LendingOutcomeSchema {
    /// Reservation after the transition.
    reservation: ReservationSchema,
    /// Element stock after the transition.
    #[schema(minimum = 0, example = 1)]
    stock: u32,
}

/// One page of results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    #[schema(example = 1)]
    pub page: u32,
    /// Page size.
    #[schema(example = 10)]
    pub per_page: u32,
    /// Items across all pages.
    #[schema(example = 42)]
    pub total: u64,
    /// Number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Convert a domain page, mapping each item.
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(f);
        Self {
            items: page.items,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageRequest;
    use utoipa::{PartialSchema, ToSchema as _};

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        assert_eq!(ErrorCodeSchema::name(), "ErrorCode");
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case() {
        assert_eq!(ErrorSchema::name(), "Error");
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(schema_json.contains("traceId"));
    }

    #[test]
    fn entity_schemas_use_camel_case_fields() {
        assert_eq!(ReservationSchema::name(), "Reservation");
        let reservation = schema_to_json::<ReservationSchema>();
        assert!(reservation.contains("elementId"));
        assert!(reservation.contains("updatedAt"));
        let element = schema_to_json::<ElementSchema>();
        assert!(element.contains("categoryId"));
        assert!(element.contains("tagIds"));
    }

    #[test]
    fn reservation_status_lists_the_lifecycle() {
        let schema_json = schema_to_json::<ReservationStatusSchema>();
        for status in ["new", "accepted", "out_of_stock", "returned"] {
            assert!(schema_json.contains(status), "missing {status}");
        }
    }

    #[test]
    fn page_response_keeps_totals() {
        let items: Vec<u32> = (0..25).collect();
        let page = PageRequest::new(3).expect("page").slice(&items);
        let response = PageResponse::from_page(page, |n| n * 2);
        assert_eq!(response.items, vec![40, 42, 44, 46, 48]);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.total, 25);
    }
}
