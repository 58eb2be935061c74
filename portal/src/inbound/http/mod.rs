//! HTTP inbound adapter serving the portal's route entries.
//!
//! Handlers take [`state::HttpState`] and the cookie-backed
//! [`session::SessionContext`], call into the domain services and turn the
//! resulting errors into redirects or JSON bodies.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod health;
pub mod listing;
pub mod loans;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every portal route entry on `cfg`.
///
/// Health probes are not included; they carry their own state. The static
/// listing paths are registered ahead of `/dashboard/loans/{id}`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use portal::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(dashboard::dashboard)
        .service(dashboard::emi_preview_handler)
        .service(listing::list_loans)
        .service(listing::next_loans_page)
        .service(listing::previous_loans_page)
        .service(listing::list_review_loans)
        .service(listing::next_review_page)
        .service(listing::previous_review_page)
        .service(loans::apply_loan_form)
        .service(loans::apply_loan)
        .service(loans::loan_detail)
        .service(loans::edit_loan_form)
        .service(loans::edit_loan)
        .service(loans::change_status)
        .service(loans::delete_loan)
        .service(loans::sanction_loan)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::set_user_status);
}
