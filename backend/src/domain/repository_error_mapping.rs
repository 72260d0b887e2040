//! Translate repository failures into domain errors.
//!
//! Connection problems become `service_unavailable`; query failures become
//! `internal`; referential conflicts and e-mail clashes become `conflict` with
//! a `code` detail.

use serde_json::json;

use super::Error;
use super::ports::{
    CatalogueRepositoryError, ElementRepositoryError, PasswordHashError,
    ReservationRepositoryError, UserRepositoryError,
};

pub(crate) fn map_element_error(error: ElementRepositoryError) -> Error {
    match error {
        ElementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("element repository unavailable: {message}"))
        }
        ElementRepositoryError::Query { message } => {
            Error::internal(format!("element repository error: {message}"))
        }
        ElementRepositoryError::InUse { message } => {
            in_use("element has reservations", message)
        }
    }
}

pub(crate) fn map_catalogue_error(kind: &str, error: CatalogueRepositoryError) -> Error {
    match error {
        CatalogueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("{kind} repository unavailable: {message}"))
        }
        CatalogueRepositoryError::Query { message } => {
            Error::internal(format!("{kind} repository error: {message}"))
        }
        CatalogueRepositoryError::InUse { message } => {
            in_use(&format!("{kind} is still in use"), message)
        }
    }
}

pub(crate) fn map_reservation_error(error: ReservationRepositoryError) -> Error {
    match error {
        ReservationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reservation repository unavailable: {message}"))
        }
        ReservationRepositoryError::Query { message } => {
            Error::internal(format!("reservation repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::EmailTaken { .. } => {
            Error::conflict("email already registered").with_details(json!({
                "code": "email_taken",
                "field": "email",
            }))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn in_use(summary: &str, message: String) -> Error {
    Error::conflict(summary).with_details(json!({
        "code": "in_use",
        "reason": message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(ElementRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ElementRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(ElementRepositoryError::in_use("fk"), ErrorCode::Conflict)]
    fn element_errors_map_by_variant(
        #[case] error: ElementRepositoryError,
        #[case] code: ErrorCode,
    ) {
        assert_eq!(map_element_error(error).code(), code);
    }

    #[rstest]
    fn in_use_carries_a_code() {
        let error = map_catalogue_error("category", CatalogueRepositoryError::in_use("3 elements"));
        assert_eq!(error.message(), "category is still in use");
        let details = error.details().expect("details");
        assert_eq!(details["code"], "in_use");
    }

    #[rstest]
    fn reservation_connection_is_unavailable() {
        let error = map_reservation_error(ReservationRepositoryError::connection("down"));
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    fn taken_emails_are_conflicts_without_echoing_the_address() {
        let error = map_user_error(UserRepositoryError::email_taken("grace@example.org"));
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert!(!error.message().contains("grace@example.org"));
        let details = error.details().expect("details");
        assert_eq!(details["code"], "email_taken");
    }
}
