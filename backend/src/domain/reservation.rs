//! Reservations and the lending state machine.
//!
//! ```text
//!            accept, stock > 0
//!   new ───────────────────────▶ accepted
//!    │
//!    │ accept, stock = 0
//!    ▼
//!   out_of_stock
//!
//!   any status ──── return ────▶ returned
//! ```
//!
//! Stock is taken when a reservation is accepted. Every return gives one unit
//! back, whatever the reservation's status was. Accept is only defined from
//! `new`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::Error;
use super::ids::{ElementId, ReservationId};
use super::user::{EmailAddress, UserId};
use super::validation::{FieldError, TextBounds};

/// Bounds for reservation comments.
pub const COMMENT_BOUNDS: TextBounds = TextBounds::new(1, 255);
/// Bounds for requester nicknames.
pub const NICKNAME_BOUNDS: TextBounds = TextBounds::new(1, 255);

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Requested, awaiting an administrator.
    New,
    /// Accepted; holds one unit of the element's stock.
    Accepted,
    /// Accept was attempted with no stock left.
    OutOfStock,
    /// The unit has been given back.
    Returned,
}

/// Effect a transition has on the element's stock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    /// Take one unit.
    Take,
    /// Give one unit back.
    Restore,
    /// Leave stock alone.
    Keep,
}

impl StockChange {
    /// Apply to `stock`, returning `None` if the result would be negative or
    /// overflow.
    pub fn apply(self, stock: u32) -> Option<u32> {
        match self {
            Self::Take => stock.checked_sub(1),
            Self::Restore => stock.checked_add(1),
            Self::Keep => Some(stock),
        }
    }
}

/// Operation requested on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingAction {
    /// Administrator accepts the request.
    Accept,
    /// The element comes back.
    Return,
}

impl LendingAction {
    /// Lower-case name for messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Return => "return",
        }
    }
}

/// Planned outcome of a transition: the target status and its stock effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Status the reservation moves to.
    pub to: ReservationStatus,
    /// Stock effect committed alongside the status change.
    pub stock: StockChange,
}

/// The requested action is not defined from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} a reservation that is {}", .action.as_str(), .from.as_str())]
pub struct InvalidTransition {
    /// Status at the time of the request.
    pub from: ReservationStatus,
    /// Requested action.
    pub action: LendingAction,
}

impl From<InvalidTransition> for Error {
    fn from(value: InvalidTransition) -> Self {
        Error::conflict(value.to_string()).with_details(json!({
            "code": "invalid_transition",
            "status": value.from.as_str(),
            "action": value.action.as_str(),
        }))
    }
}

impl ReservationStatus {
    /// Canonical status name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Accepted => "accepted",
            Self::OutOfStock => "out_of_stock",
            Self::Returned => "returned",
        }
    }

    /// Plan an accept given the element's current stock.
    ///
    /// # Examples
    /// ```
    /// use lending_backend::domain::{ReservationStatus, StockChange};
    ///
    /// let plan = ReservationStatus::New.plan_accept(2).unwrap();
    /// assert_eq!(plan.to, ReservationStatus::Accepted);
    /// assert_eq!(plan.stock, StockChange::Take);
    ///
    /// let plan = ReservationStatus::New.plan_accept(0).unwrap();
    /// assert_eq!(plan.to, ReservationStatus::OutOfStock);
    /// assert_eq!(plan.stock, StockChange::Keep);
    /// ```
    pub fn plan_accept(self, stock: u32) -> Result<TransitionPlan, InvalidTransition> {
        match self {
            Self::New if stock > 0 => Ok(TransitionPlan {
                to: Self::Accepted,
                stock: StockChange::Take,
            }),
            Self::New => Ok(Self::out_of_stock_plan()),
            from => Err(InvalidTransition {
                from,
                action: LendingAction::Accept,
            }),
        }
    }

    /// Plan a return. Defined from every status; the unit always goes back.
    ///
    /// # Examples
    /// ```
    /// use lending_backend::domain::{ReservationStatus, StockChange};
    ///
    /// let plan = ReservationStatus::New.plan_return();
    /// assert_eq!(plan.to, ReservationStatus::Returned);
    /// assert_eq!(plan.stock, StockChange::Restore);
    /// ```
    pub const fn plan_return(self) -> TransitionPlan {
        TransitionPlan {
            to: Self::Returned,
            stock: StockChange::Restore,
        }
    }

    /// Fallback when a concurrent accept took the last unit.
    pub const fn out_of_stock_plan() -> TransitionPlan {
        TransitionPlan {
            to: Self::OutOfStock,
            stock: StockChange::Keep,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "accepted" => Ok(Self::Accepted),
            "out_of_stock" => Ok(Self::OutOfStock),
            "returned" => Ok(Self::Returned),
            _ => Err(FieldError::Malformed { field: "status" }),
        }
    }
}

/// Who asked for the element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    /// Contact e-mail.
    pub email: EmailAddress,
    /// Display nickname.
    pub nickname: String,
    /// Linked account when the requester was signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Requester {
    /// Validate requester contact details.
    pub fn new(email: &str, nickname: &str, user_id: Option<UserId>) -> Result<Self, FieldError> {
        Ok(Self {
            email: EmailAddress::new(email, "email")?,
            nickname: NICKNAME_BOUNDS.check(nickname, "nickname")?,
            user_id,
        })
    }
}

/// One user's claim on one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Identifier.
    pub id: ReservationId,
    /// Reserved element.
    pub element_id: ElementId,
    /// Lifecycle status.
    pub status: ReservationStatus,
    /// Requester contact details.
    pub requester: Requester,
    /// Free-text note from the requester.
    pub comment: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status or comment change.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Open a new reservation in status [`ReservationStatus::New`].
    pub fn open(id: ReservationId, draft: ReservationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            element_id: draft.element_id,
            status: ReservationStatus::New,
            requester: draft.requester,
            comment: draft.comment,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated reservation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    element_id: ElementId,
    requester: Requester,
    comment: String,
}

impl ReservationDraft {
    /// Validate a reservation request.
    pub fn new(element_id: ElementId, requester: Requester, comment: &str) -> Result<Self, FieldError> {
        Ok(Self {
            element_id,
            requester,
            comment: validate_comment(comment)?,
        })
    }

    /// Element being reserved.
    pub fn element_id(&self) -> ElementId {
        self.element_id
    }
}

/// Validate a reservation comment.
pub fn validate_comment(comment: &str) -> Result<String, FieldError> {
    COMMENT_BOUNDS.check(comment, "comment")
}
