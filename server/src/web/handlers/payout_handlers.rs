// server/src/web/handlers/payout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::payouts;
use crate::errors::AppError;
use crate::pipelines::contexts::PayoutRequestCtxData;
use crate::pipelines::payout_pipeline::partner_balance;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use carshare_core::{ContextData, PayoutStatus, Permission, PipelineResult, Role};

#[derive(Deserialize, Debug)]
pub struct PayoutListQuery {
  pub status: Option<PayoutStatus>,
}

#[derive(Deserialize, Debug)]
pub struct PayoutRequestPayload {
  pub amount_cents: i64,
}

#[derive(Deserialize, Debug)]
pub struct ProcessPayoutPayload {
  pub approve: bool,
}

/// Partners see their own payouts and balance; staff see every payout.
#[instrument(name = "handler::list_payouts", skip(app_state, auth), fields(user_id = %auth.user.id))]
pub async fn list_payouts_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<PayoutListQuery>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ViewPartnerPayout)?;
  if auth.user.role == Role::Partner {
    let list = payouts::list_for_partner(&app_state.db_pool, auth.user.id).await?;
    let balance = partner_balance(&app_state.db_pool, auth.user.id, app_state.config.partner_share_percent).await?;
    return Ok(HttpResponse::Ok().json(json!({ "payouts": list, "balance": balance })));
  }
  let list = payouts::list_all(&app_state.db_pool, query.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "payouts": list })))
}

#[instrument(
  name = "handler::request_payout",
  skip(app_state, auth, payload),
  fields(user_id = %auth.user.id, amount_cents = payload.amount_cents)
)]
pub async fn request_payout_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  payload: web::Json<PayoutRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(PayoutRequestCtxData {
    app_state: app_state.get_ref().clone(),
    partner: auth.user,
    amount_cents: payload.amount_cents,
    balance: None,
    payout: None,
  });

  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let data = ctx.snapshot();
      let payout = data
        .payout
        .ok_or_else(|| AppError::Internal("Payout pipeline completed without a payout.".to_string()))?;
      Ok(HttpResponse::Created().json(json!({ "payout": payout, "balance": data.balance })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(name = "handler::process_payout", skip(app_state, auth, payload), fields(payout_id = %path.as_ref()))]
pub async fn process_payout_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<ProcessPayoutPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ChangePartnerPayout)?;
  auth.require_staff()?;
  let payout_id = path.into_inner();
  let status = if payload.approve {
    PayoutStatus::Paid
  } else {
    PayoutStatus::Rejected
  };
  match payouts::process_payout(&app_state.db_pool, payout_id, status, auth.user.id).await? {
    Some(payout) => {
      info!(payout_id = %payout.id, status = %payout.status, "Payout processed.");
      Ok(HttpResponse::Ok().json(payout))
    }
    None => match payouts::get_payout(&app_state.db_pool, payout_id).await? {
      Some(existing) => Err(AppError::Conflict(format!(
        "Payout was already processed (status '{}').",
        existing.status
      ))),
      None => Err(AppError::NotFound("Payout not found.".to_string())),
    },
  }
}
