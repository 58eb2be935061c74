//! User administration screen. Administrators only.
//!
//! ```text
//! GET  /dashboard/users
//! POST /dashboard/users               {"email":"analyst@loanapp.com","password":"s3cret","role":"USER"}
//! PUT  /dashboard/users/{id}/status   {"active":false}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ApiResult;
use super::guard::enter;
use super::schemas::{ErrorSchema, UserAccountSchema};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{
    Error, NewUserAccount, NewUserAccountError, PortalRoute, Role, UserAccount, UserAccountId,
};

/// Body of `POST /dashboard/users`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "analyst@loanapp.com")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
    #[schema(value_type = String, example = "USER")]
    pub role: Role,
}

impl TryFrom<&CreateUserRequest> for NewUserAccount {
    type Error = NewUserAccountError;

    fn try_from(value: &CreateUserRequest) -> Result<Self, Self::Error> {
        Self::try_new(&value.email, &value.password, value.role)
    }
}

/// Body of `PUT /dashboard/users/{id}/status`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserStatusRequest {
    pub active: bool,
}

/// Accounts table.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersView {
    #[schema(value_type = Vec<UserAccountSchema>)]
    pub users: Vec<UserAccount>,
}

fn map_new_account_error(err: NewUserAccountError) -> Error {
    let field = match err {
        NewUserAccountError::Email(_) => "email",
        NewUserAccountError::EmptyPassword => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// List every account.
#[utoipa::path(
    get,
    path = "/dashboard/users",
    responses(
        (status = 200, description = "Accounts", body = UsersView),
        (status = 303, description = "No session, or not an administrator"),
        (status = 503, description = "Backend unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/dashboard/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UsersView>> {
    let current = enter(&state, &session, PortalRoute::Users).await?;
    let users = session.settle(state.users.list(&current).await)?;
    Ok(web::Json(UsersView { users }))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/dashboard/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserAccountSchema),
        (status = 303, description = "No session, or not an administrator"),
        (status = 400, description = "Invalid email or empty password", body = ErrorSchema),
        (status = 502, description = "Backend refused the account", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/dashboard/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let current = enter(&state, &session, PortalRoute::Users).await?;
    let account = NewUserAccount::try_from(&*payload).map_err(map_new_account_error)?;
    let created = session.settle(state.users.create(&current, &account).await)?;
    Ok(HttpResponse::Created().json(created))
}

/// Activate or deactivate an account.
#[utoipa::path(
    put,
    path = "/dashboard/users/{id}/status",
    params(("id" = String, Path, description = "Account identifier")),
    request_body = UserStatusRequest,
    responses(
        (status = 200, description = "Account updated", body = UserAccountSchema),
        (status = 303, description = "No session, not an administrator, or unknown account"),
        (status = 502, description = "Backend refused the change", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setUserStatus"
)]
#[put("/dashboard/users/{id}/status")]
pub async fn set_user_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UserStatusRequest>,
) -> ApiResult<web::Json<UserAccount>> {
    let current = enter(&state, &session, PortalRoute::Users).await?;
    let id = UserAccountId::new(path.into_inner());
    let updated = session.settle(
        state
            .users
            .set_active(&current, &id, payload.active)
            .await,
    )?;
    Ok(web::Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn request(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            role: Role::User,
        }
    }

    #[rstest]
    #[case(request("not-an-email", "s3cret"), "email")]
    #[case(request("analyst@loanapp.com", ""), "password")]
    fn invalid_accounts_name_the_field(#[case] input: CreateUserRequest, #[case] field: &str) {
        let error = NewUserAccount::try_from(&input)
            .map_err(map_new_account_error)
            .expect_err("invalid account");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details(), Some(&json!({ "field": field })));
    }

    #[rstest]
    fn create_requests_decode_upper_case_roles() {
        let decoded: CreateUserRequest = serde_json::from_str(
            r#"{"email":"analyst@loanapp.com","password":"s3cret","role":"ADMIN"}"#,
        )
        .expect("decode");
        let account = NewUserAccount::try_from(&decoded).expect("valid account");
        assert_eq!(account.role(), Role::Admin);
        assert_eq!(account.email().as_ref(), "analyst@loanapp.com");
    }
}
