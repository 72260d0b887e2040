//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: hold the lending rules independent of transport and storage.
//! Entities validate themselves on construction; services coordinate the
//! repository ports; [`authorization`] is a pure policy table consulted by
//! inbound adapters before calling a driving port.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-neutral failure payload.
//! - [`Element`], [`Category`], [`Tag`], [`Author`]: the catalogue.
//! - [`Reservation`] and [`ReservationStatus`]: the lending state machine.
//! - [`vote`] / [`authorize`]: role-based access decisions.

pub mod auth;
pub mod authorization;
pub mod catalogue;
mod catalogue_service;
pub mod element;
mod element_service;
pub mod error;
pub mod ids;
pub mod pagination;
pub mod ports;
mod repository_error_mapping;
pub mod reservation;
mod reservation_service;
pub mod slug;
pub mod trace_id;
pub mod user;
mod user_service;
pub mod validation;

pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PASSWORD_BOUNDS, PasswordDigest,
    Registration,
};
pub use self::authorization::{
    Action, POLICY, ResourceKind, Rule, UnsupportedAttribute, Vote, authorize, decide,
    required_role, vote,
};
pub use self::catalogue::{
    AUTHOR_NAME_BOUNDS, AUTHOR_SURNAME_BOUNDS, Author, AuthorDraft, CATEGORY_TITLE_BOUNDS,
    Category, CategoryDraft, Classification, TAG_TITLE_BOUNDS, Tag, TagDraft,
};
pub use self::catalogue_service::ClassificationService;
pub use self::element::{
    ELEMENT_DESCRIPTION_BOUNDS, ELEMENT_TITLE_BOUNDS, Element, ElementDraft, ElementFilter,
    ElementInput,
};
pub use self::element_service::ElementService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::ids::{AuthorId, CategoryId, ElementId, ReservationId, TagId};
pub use self::pagination::{ITEMS_PER_PAGE, Page, PageRequest};
pub use self::reservation::{
    COMMENT_BOUNDS, InvalidTransition, LendingAction, NICKNAME_BOUNDS, Requester, Reservation,
    ReservationDraft, ReservationStatus, StockChange, TransitionPlan, validate_comment,
};
pub use self::reservation_service::ReservationService;
pub use self::slug::{SLUG_MAX, is_valid_slug, slugify};
pub use self::trace_id::TraceId;
pub use self::user::{
    Actor, EMAIL_MAX, EmailAddress, FIRST_NAME_BOUNDS, LAST_NAME_BOUNDS, Role, User, UserId,
    UserProfile,
};
pub use self::user_service::{RecordingLoginService, UserAccountService};
pub use self::validation::{FieldError, TextBounds};
