// server/src/web/extractors.rs

use crate::db::sessions;
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use carshare_core::{Permission, Role};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

/// The user behind the request's `Authorization: Bearer <token>` session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
  pub token: String,
}

impl AuthenticatedUser {
  pub fn require(&self, permission: Permission) -> AppResult<()> {
    if self.user.role.can(permission) {
      Ok(())
    } else {
      warn!(user_id = %self.user.id, role = %self.user.role, permission = %permission, "Permission denied.");
      Err(AppError::Forbidden(format!(
        "Your role ({}) lacks the '{}' permission.",
        self.user.role.display_name(),
        permission.codename()
      )))
    }
  }

  pub fn require_role(&self, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&self.user.role) {
      Ok(())
    } else {
      warn!(user_id = %self.user.id, role = %self.user.role, "Role not allowed for this endpoint.");
      Err(AppError::Forbidden("You do not have access to this resource.".to_string()))
    }
  }

  pub fn require_staff(&self) -> AppResult<()> {
    self.require_role(&[Role::Manager, Role::Admin])
  }
}

/// The token from an `Authorization: Bearer` header, if well formed.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  let token = token.trim();
  if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
    Some(token.to_string())
  } else {
    None
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = bearer_token(req);
    let state = req.app_data::<web::Data<AppState>>().cloned();
    Box::pin(async move {
      let token =
        token.ok_or_else(|| AppError::Auth("Authentication credentials were not provided.".to_string()))?;
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let user = sessions::find_user_by_token(&state.db_pool, &token)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid or expired session token.".to_string()))?;
      Ok::<_, AppError>(AuthenticatedUser { user, token })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pipelines::test_support::test_user;
  use actix_web::test::TestRequest;

  #[test]
  fn bearer_token_parsing() {
    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Bearer abc123"))
      .to_http_request();
    assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));

    let lower = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "bearer   xyz "))
      .to_http_request();
    assert_eq!(bearer_token(&lower).as_deref(), Some("xyz"));

    let basic = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
      .to_http_request();
    assert_eq!(bearer_token(&basic), None);

    assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
  }

  #[test]
  fn permission_and_role_checks() {
    let client = AuthenticatedUser {
      user: test_user(Role::Client),
      token: "t".to_string(),
    };
    assert!(client.require(Permission::AddBooking).is_ok());
    assert!(matches!(client.require(Permission::AddCar), Err(AppError::Forbidden(_))));
    assert!(client.require_staff().is_err());

    let manager = AuthenticatedUser {
      user: test_user(Role::Manager),
      token: "t".to_string(),
    };
    assert!(manager.require_staff().is_ok());
    assert!(manager.require_role(&[Role::Admin]).is_err());
  }
}
