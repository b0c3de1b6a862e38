use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::MONTH_LABELS;
use crate::error::Result;
use crate::ledger::OrderLedger;
use crate::revenue::{monthly_revenue, reporting_offset};
use crate::routes::validation::authorize_store;
use crate::stores;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MonthRevenue {
    pub label: &'static str,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    pub series: Vec<MonthRevenue>,
}

/// Monthly revenue series over the store's paid orders
///
/// Always answers twelve buckets, January first, including for a store with
/// no orders.
pub async fn store_revenue(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RevenueResponse>> {
    authorize_store(&headers, &store_id, &state.config)?;
    stores::require_store(&state.db, &store_id).await?;

    let ledger = OrderLedger::new(state.db.clone(), state.config.price_mode);
    let orders = ledger.paid_orders(&store_id).await?;

    let offset = reporting_offset(state.config.revenue_utc_offset_minutes);
    let series = monthly_revenue(&orders, offset);

    tracing::info!(
        "Revenue series computed for store {} over {} paid orders",
        store_id,
        orders.len()
    );

    let series = MONTH_LABELS
        .iter()
        .copied()
        .zip(series.totals().iter())
        .map(|(label, total)| MonthRevenue {
            label,
            total: *total,
        })
        .collect();

    Ok(Json(RevenueResponse { series }))
}
