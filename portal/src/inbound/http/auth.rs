//! Login entry point and logout.
//!
//! ```text
//! GET  /login
//! POST /login  {"email":"user@loanapp.com","password":"user123"}
//! POST /logout
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ApiResult;
use super::schemas::ErrorSchema;
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{Error, LoginCredentials, LoginValidationError, PortalRoute};

/// Login request body for `POST /login`.
#[derive(Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user@loanapp.com")]
    pub email: String,
    #[schema(example = "user123")]
    pub password: String,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// View model of the login page.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    /// Where the credentials are posted.
    #[schema(example = "/login")]
    pub action: &'static str,
}

pub(super) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Login page. A caller that already holds a session goes to the dashboard.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", body = LoginView),
        (status = 303, description = "Already signed in; redirect to /dashboard")
    ),
    tags = ["session"],
    operation_id = "loginPage",
    security([])
)]
#[get("/login")]
pub async fn login_page(session: SessionContext) -> HttpResponse {
    if session.load().is_some() {
        return see_other(PortalRoute::Dashboard.path());
    }
    HttpResponse::Ok().json(LoginView {
        action: PortalRoute::Login.path(),
    })
}

/// Exchange credentials for a session and continue to the dashboard.
///
/// Bad credentials redirect back to `/login` without leaving a session.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in; redirect to /dashboard", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank email or password", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(&payload.into_inner()).map_err(map_login_validation_error)?;
    let established = session.settle(state.login.login(&credentials).await)?;
    session.renew();
    session.persist(&established)?;
    Ok(see_other(PortalRoute::Dashboard.path()))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out; redirect to /login")),
    tags = ["session"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    see_other(PortalRoute::Login.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};

    #[given("a login form with an empty password")]
    fn a_login_form_with_an_empty_password() -> LoginRequest {
        LoginRequest {
            email: "user@loanapp.com".to_owned(),
            password: String::new(),
        }
    }

    #[when("the form is validated")]
    fn the_form_is_validated(request: LoginRequest) -> Result<LoginCredentials, Error> {
        LoginCredentials::try_from(&request).map_err(map_login_validation_error)
    }

    #[then("the password field is reported")]
    fn the_password_field_is_reported(result: Result<LoginCredentials, Error>) {
        let error = result.expect_err("empty password is refused");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details(), Some(&json!({ "field": "password" })));
    }

    #[rstest]
    fn empty_passwords_never_reach_the_backend() {
        let request = a_login_form_with_an_empty_password();
        let result = the_form_is_validated(request);
        the_password_field_is_reported(result);
    }
}
