//! Analytics report wire models.
//!
//! These types define the `data` payloads returned by the six analytics
//! endpoints. Field names serialize in camelCase to match the existing CRM
//! client; breakdown entries keep the `_id` group-key spelling the client
//! already consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional date window restricting `created_at` per entity.
///
/// Both bounds are inclusive; an open bound leaves that side unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ReportWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// An unrestricted window.
    pub fn open() -> Self {
        Self::default()
    }
}

// ============================================================================
// Overview
// ============================================================================

/// Headline counts and revenue totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewReport {
    pub customers: CustomerOverview,
    pub leads: LeadOverview,
    pub deals: DealOverview,
    pub revenue: RevenueOverview,
    pub metrics: OverviewMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOverview {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadOverview {
    pub total: i64,
    pub qualified: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealOverview {
    pub total: i64,
    pub won: i64,
    pub lost: i64,
}

/// Revenue totals. `total_revenue` is never date-filtered, matching the
/// behavior analytics consumers already depend on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOverview {
    pub total_revenue: f64,
    pub monthly_recurring: f64,
}

/// Derived headline metrics, all percentages rounded to two decimals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewMetrics {
    pub conversion_rate: f64,
    pub win_rate: f64,
    pub avg_deal_size: f64,
}

// ============================================================================
// Trends
// ============================================================================

/// Month-bucketed series over a sliding window.
///
/// Series are sparse: months with no activity are absent. Consumers wanting
/// a dense series can apply [`crate::services::reporting::densify_monthly`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsReport {
    pub months: u32,
    pub customers: Vec<MonthlyCount>,
    pub leads: Vec<MonthlyCount>,
    pub deals: Vec<MonthlyRevenue>,
    pub revenue: Vec<MonthlyAmount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub count: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAmount {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
}

// ============================================================================
// Lead performance
// ============================================================================

/// Lead funnel breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPerformanceReport {
    pub by_source: Vec<SourcePerformance>,
    pub by_status: Vec<StatusCount>,
    pub score_distribution: Vec<ScoreBucket>,
    pub avg_days_to_conversion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePerformance {
    #[serde(rename = "_id")]
    pub source: String,
    pub count: i64,
    pub qualified: i64,
    pub converted: i64,
    pub total_estimated_value: f64,
}

/// Generic count grouped by a raw status value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    #[serde(rename = "_id")]
    pub status: String,
    pub count: i64,
}

/// One fixed score-histogram bucket. All six buckets are always emitted,
/// zero-filled, including the `other` overflow bucket for out-of-range
/// scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBucket {
    #[serde(rename = "_id")]
    pub range: String,
    pub count: i64,
}

// ============================================================================
// Deal pipeline
// ============================================================================

/// Pipeline stage distribution and forecast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealPipelineReport {
    pub by_stage: Vec<StagePerformance>,
    pub expected_revenue: f64,
    pub avg_cycle_days: f64,
    pub top_open_deals: Vec<TopDeal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePerformance {
    #[serde(rename = "_id")]
    pub stage: String,
    pub count: i64,
    pub total_value: f64,
    pub avg_probability: f64,
}

/// Open deal enriched with denormalized owner and customer projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDeal {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub value: f64,
    pub stage: String,
    pub probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<TopDealOwner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<TopDealCustomer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDealOwner {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDealCustomer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

// ============================================================================
// Customer insights
// ============================================================================

/// Customer segmentation summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInsightsReport {
    pub by_status: Vec<StatusCount>,
    pub by_plan_type: Vec<PlanTypeBreakdown>,
    pub by_churn_risk: Vec<StatusCount>,
    pub nps: NpsSummary,
    pub lifetime_value: LifetimeValueStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTypeBreakdown {
    #[serde(rename = "_id")]
    pub plan_type: String,
    pub count: i64,
    pub avg_price: f64,
}

/// NPS summary over customers with a recorded 0-10 survey score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpsSummary {
    pub avg_score: f64,
    pub promoters: i64,
    pub passives: i64,
    pub detractors: i64,
    pub responses: i64,
    pub nps_score: f64,
}

/// Lifetime-value aggregate over customers with a positive lifetime value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeValueStats {
    pub avg: f64,
    pub total: f64,
    pub max: f64,
    pub min: f64,
}

// ============================================================================
// Team performance
// ============================================================================

/// Per-user attribution rollups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformanceReport {
    pub leads: Vec<LeadLeaderboardEntry>,
    pub deals: Vec<DealLeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadLeaderboardEntry {
    #[serde(rename = "_id")]
    pub user_id: Uuid,
    pub name: String,
    pub total_leads: i64,
    pub converted: i64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealLeaderboardEntry {
    #[serde(rename = "_id")]
    pub user_id: Uuid,
    pub name: String,
    pub total_deals: i64,
    pub won: i64,
    pub revenue: f64,
    pub win_rate: f64,
}
