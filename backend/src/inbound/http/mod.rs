//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every handler below is mounted under `/api/v1` by [`configure`]; the
//! health probes sit at the root so orchestrators reach them without a
//! session.

pub mod authors;
pub mod categories;
pub mod elements;
pub mod error;
pub mod health;
pub mod reservations;
pub mod schemas;
pub mod session;
pub mod state;
pub mod tags;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments such as `/reservations/mine` are registered ahead of the
/// `{id}` routes that would otherwise capture them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::change_password)
        .service(categories::list_categories)
        .service(categories::create_category)
        .service(categories::list_category_elements)
        .service(categories::get_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(tags::list_tags)
        .service(tags::create_tag)
        .service(tags::get_tag)
        .service(tags::update_tag)
        .service(tags::delete_tag)
        .service(authors::list_authors)
        .service(authors::create_author)
        .service(authors::get_author)
        .service(authors::update_author)
        .service(authors::delete_author)
        .service(elements::list_elements)
        .service(elements::create_element)
        .service(elements::get_element)
        .service(elements::update_element)
        .service(elements::delete_element)
        .service(reservations::list_reservations)
        .service(reservations::create_reservation)
        .service(reservations::list_own_reservations)
        .service(reservations::get_reservation)
        .service(reservations::update_reservation)
        .service(reservations::delete_reservation)
        .service(reservations::accept_reservation)
        .service(reservations::return_reservation);
}
