//! Shared parsing helpers for inbound HTTP adapters.
//!
//! Path segments, query strings, and body identifiers arrive as text; these
//! helpers turn them into domain ids and pages with uniform error details of
//! the form `{field, code, value?, index?}`.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{Error, PageRequest};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidPage,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidPage => "invalid_page",
        }
    }
}

/// HTTP-facing field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "code": ErrorCode::InvalidUuid.as_str(),
        "value": value,
    }))
}

/// Parse a single identifier.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an optional identifier, treating absence as `None`.
pub(crate) fn parse_optional_id<T: FromStr>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_id(raw, field)).transpose()
}

/// Parse a list of identifiers, reporting the first bad index.
pub(crate) fn parse_id_list<T: FromStr>(values: &[String], field: FieldName) -> Result<Vec<T>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.trim().parse().map_err(|_| {
                let name = field.as_str();
                Error::invalid_request(format!("{name} must contain valid UUIDs")).with_details(
                    json!({
                        "field": name,
                        "code": ErrorCode::InvalidUuid.as_str(),
                        "index": index,
                        "value": value,
                    }),
                )
            })
        })
        .collect()
}

/// `?page=N` query parameter, 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1. Defaults to the first page.
    #[param(minimum = 1, example = 1)]
    pub page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn to_request(self) -> Result<PageRequest, Error> {
        match self.page {
            None => Ok(PageRequest::first()),
            Some(page) => PageRequest::new(page).map_err(|_| {
                field_error(
                    FieldName::new("page"),
                    ErrorCode::InvalidPage,
                    "page must be at least 1".to_owned(),
                )
            }),
        }
    }
}
