//! Analytics aggregate row entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer headline counts for the overview report.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerCountsRow {
    pub total: i64,
    pub active: i64,
}

/// Lead headline counts for the overview report.
#[derive(Debug, Clone, FromRow)]
pub struct LeadCountsRow {
    pub total: i64,
    pub qualified: i64,
}

/// Deal headline counts for the overview report.
#[derive(Debug, Clone, FromRow)]
pub struct DealCountsRow {
    pub total: i64,
    pub won: i64,
    pub lost: i64,
}

/// Generic grouped count keyed by a raw column value.
#[derive(Debug, Clone, FromRow)]
pub struct GroupCountRow {
    pub key: String,
    pub count: i64,
}

/// Month bucket with a count.
#[derive(Debug, Clone, FromRow)]
pub struct MonthBucketRow {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

/// Month bucket with a count and summed revenue.
#[derive(Debug, Clone, FromRow)]
pub struct MonthRevenueRow {
    pub year: i32,
    pub month: i32,
    pub count: i64,
    pub revenue: f64,
}

/// Per-source lead funnel rollup.
#[derive(Debug, Clone, FromRow)]
pub struct SourcePerformanceRow {
    pub source: String,
    pub count: i64,
    pub qualified: i64,
    pub converted: i64,
    pub total_estimated_value: f64,
}

/// Per-stage deal rollup.
#[derive(Debug, Clone, FromRow)]
pub struct StagePerformanceRow {
    pub stage: String,
    pub count: i64,
    pub total_value: f64,
    pub avg_probability: f64,
}

/// Open deal joined with its owner and customer for the top-deals projection.
#[derive(Debug, Clone, FromRow)]
pub struct TopDealRow {
    pub id: Uuid,
    pub title: String,
    pub value: f64,
    pub stage: String,
    pub probability: f64,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub owner_id: Option<Uuid>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub owner_email: Option<String>,
    pub customer_id: Option<Uuid>,
    pub customer_first_name: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_company: Option<String>,
}

/// Per-plan-type customer rollup.
#[derive(Debug, Clone, FromRow)]
pub struct PlanTypeRow {
    pub plan_type: String,
    pub count: i64,
    pub avg_price: f64,
}

/// NPS survey aggregate over customers with a recorded score.
#[derive(Debug, Clone, FromRow)]
pub struct NpsRow {
    pub responses: i64,
    pub avg_score: f64,
    pub promoters: i64,
    pub passives: i64,
    pub detractors: i64,
}

/// Lifetime-value aggregate over customers with a positive lifetime value.
#[derive(Debug, Clone, FromRow)]
pub struct LifetimeValueRow {
    pub avg_value: f64,
    pub total_value: f64,
    pub max_value: f64,
    pub min_value: f64,
}

/// Per-user lead attribution rollup.
#[derive(Debug, Clone, FromRow)]
pub struct LeadAttributionRow {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub total_leads: i64,
    pub converted: i64,
}

/// Per-user deal attribution rollup.
#[derive(Debug, Clone, FromRow)]
pub struct DealAttributionRow {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub total_deals: i64,
    pub won: i64,
    pub revenue: f64,
}
