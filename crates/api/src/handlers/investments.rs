//! Handlers for the `/investments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hearth_core::error::CoreError;
use hearth_core::investment::{summarize, validate_kind, InvestmentReturn, PortfolioSummary};
use hearth_core::money::{validate_amount, validate_non_negative_amount};
use hearth_core::types::DbId;
use hearth_db::models::investment::{CreateInvestment, Investment, UpdateInvestment};
use hearth_db::repositories::InvestmentRepo;
use serde::Serialize;

use crate::error::{invalid, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// An investment with its computed return.
#[derive(Debug, Serialize)]
pub struct InvestmentView {
    #[serde(flatten)]
    pub investment: Investment,
    #[serde(rename = "return")]
    pub returns: InvestmentReturn,
}

impl From<Investment> for InvestmentView {
    fn from(investment: Investment) -> Self {
        let returns =
            InvestmentReturn::compute(investment.amount_invested, investment.current_value);
        Self {
            investment,
            returns,
        }
    }
}

/// GET /api/v1/investments
pub async fn list_investments(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<InvestmentView>>>> {
    let rows = InvestmentRepo::list(&state.pool, auth.family_id).await?;
    let data = rows.into_iter().map(InvestmentView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/investments/summary
pub async fn investment_summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PortfolioSummary>>> {
    let rows = InvestmentRepo::list(&state.pool, auth.family_id).await?;
    let summary = summarize(
        rows.iter()
            .map(|i| (i.kind.as_str(), i.amount_invested, i.current_value)),
    );
    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/investments
pub async fn create_investment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInvestment>,
) -> AppResult<(StatusCode, Json<DataResponse<InvestmentView>>)> {
    validate_name(&input.name)?;
    validate_kind(&input.kind).map_err(invalid)?;
    validate_amount(input.amount_invested).map_err(invalid)?;
    if let Some(current) = input.current_value {
        validate_non_negative_amount(current).map_err(invalid)?;
    }

    let investment = InvestmentRepo::create(&state.pool, auth.family_id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: investment.into(),
        }),
    ))
}

/// GET /api/v1/investments/{id}
pub async fn get_investment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InvestmentView>>> {
    let investment = InvestmentRepo::find_by_id(&state.pool, auth.family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investment",
            id,
        }))?;
    Ok(Json(DataResponse {
        data: investment.into(),
    }))
}

/// PUT /api/v1/investments/{id}
pub async fn update_investment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvestment>,
) -> AppResult<Json<DataResponse<InvestmentView>>> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(kind) = &input.kind {
        validate_kind(kind).map_err(invalid)?;
    }
    if let Some(invested) = input.amount_invested {
        validate_amount(invested).map_err(invalid)?;
    }
    if let Some(current) = input.current_value {
        validate_non_negative_amount(current).map_err(invalid)?;
    }

    let investment = InvestmentRepo::update(&state.pool, auth.family_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investment",
            id,
        }))?;
    Ok(Json(DataResponse {
        data: investment.into(),
    }))
}

/// DELETE /api/v1/investments/{id}
pub async fn delete_investment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if InvestmentRepo::delete(&state.pool, auth.family_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Investment",
            id,
        }))
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(invalid("Investment name must not be empty".into()));
    }
    Ok(())
}
