//! Analytics repository.
//!
//! All report queries live here. Each method is a single aggregate query;
//! the route handlers fan independent queries out concurrently and derive
//! the remaining metrics in-process. Every query is read-only.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use domain::models::{CustomerStatus, DealStage, LeadStatus, ReportWindow};

use crate::entities::{
    CustomerCountsRow, DealAttributionRow, DealCountsRow, GroupCountRow, LeadAttributionRow,
    LeadCountsRow, LifetimeValueRow, MonthBucketRow, MonthRevenueRow, NpsRow, PlanTypeRow,
    SourcePerformanceRow, StagePerformanceRow, TopDealRow,
};

/// Repository for the analytics report queries.
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Overview
    // ========================================================================

    /// Customer headline counts, optionally restricted by creation date.
    pub async fn customer_counts(
        &self,
        window: &ReportWindow,
    ) -> Result<CustomerCountsRow, sqlx::Error> {
        sqlx::query_as::<_, CustomerCountsRow>(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status = $3) as active
            FROM customers
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(CustomerStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Lead headline counts, optionally restricted by creation date.
    pub async fn lead_counts(&self, window: &ReportWindow) -> Result<LeadCountsRow, sqlx::Error> {
        sqlx::query_as::<_, LeadCountsRow>(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status = $3) as qualified
            FROM leads
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(LeadStatus::Qualified.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Deal headline counts, optionally restricted by creation date.
    pub async fn deal_counts(&self, window: &ReportWindow) -> Result<DealCountsRow, sqlx::Error> {
        sqlx::query_as::<_, DealCountsRow>(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE stage = $3) as won,
                COUNT(*) FILTER (WHERE stage = $4) as lost
            FROM deals
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(DealStage::ClosedWon.as_str())
        .bind(DealStage::ClosedLost.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Sum of value over closed-won deals. Never date-filtered.
    pub async fn total_won_revenue(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(value), 0)::float8
            FROM deals
            WHERE stage = $1
            "#,
        )
        .bind(DealStage::ClosedWon.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Sum of plan price over active customers with ISP plan data.
    pub async fn monthly_recurring_revenue(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(plan_price), 0)::float8
            FROM customers
            WHERE status = $1 AND plan_price IS NOT NULL
            "#,
        )
        .bind(CustomerStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await
    }

    // ========================================================================
    // Trends
    // ========================================================================

    /// Customers grouped by creation (year, month) since the given instant.
    pub async fn customers_by_month(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthBucketRow>, sqlx::Error> {
        sqlx::query_as::<_, MonthBucketRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM created_at)::int4 as year,
                EXTRACT(MONTH FROM created_at)::int4 as month,
                COUNT(*) as count
            FROM customers
            WHERE created_at >= $1
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }

    /// Leads grouped by creation (year, month) since the given instant.
    pub async fn leads_by_month(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthBucketRow>, sqlx::Error> {
        sqlx::query_as::<_, MonthBucketRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM created_at)::int4 as year,
                EXTRACT(MONTH FROM created_at)::int4 as month,
                COUNT(*) as count
            FROM leads
            WHERE created_at >= $1
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }

    /// Closed-won deals grouped by close (year, month), with summed value.
    pub async fn won_deals_by_month(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthRevenueRow>, sqlx::Error> {
        sqlx::query_as::<_, MonthRevenueRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM actual_close_date)::int4 as year,
                EXTRACT(MONTH FROM actual_close_date)::int4 as month,
                COUNT(*) as count,
                COALESCE(SUM(value), 0)::float8 as revenue
            FROM deals
            WHERE stage = $1
              AND actual_close_date IS NOT NULL
              AND actual_close_date >= $2
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(DealStage::ClosedWon.as_str())
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }

    // ========================================================================
    // Lead performance
    // ========================================================================

    /// Per-source funnel rollup, sorted by count descending.
    pub async fn lead_source_performance(
        &self,
    ) -> Result<Vec<SourcePerformanceRow>, sqlx::Error> {
        sqlx::query_as::<_, SourcePerformanceRow>(
            r#"
            SELECT
                source,
                COUNT(*) as count,
                COUNT(*) FILTER (WHERE status = $1) as qualified,
                COUNT(*) FILTER (WHERE status = $2) as converted,
                COALESCE(SUM(estimated_value), 0)::float8 as total_estimated_value
            FROM leads
            GROUP BY source
            ORDER BY count DESC
            "#,
        )
        .bind(LeadStatus::Qualified.as_str())
        .bind(LeadStatus::ClosedWon.as_str())
        .fetch_all(&self.pool)
        .await
    }

    /// Lead counts grouped by raw status, sorted by count descending.
    pub async fn lead_status_counts(&self) -> Result<Vec<GroupCountRow>, sqlx::Error> {
        sqlx::query_as::<_, GroupCountRow>(
            r#"
            SELECT status as key, COUNT(*) as count
            FROM leads
            GROUP BY status
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Score histogram over the fixed bucket boundaries, sparse.
    ///
    /// Out-of-range scores fall into the `other` bucket; the handler
    /// zero-fills absent buckets.
    pub async fn lead_score_histogram(&self) -> Result<Vec<GroupCountRow>, sqlx::Error> {
        sqlx::query_as::<_, GroupCountRow>(
            r#"
            SELECT
                CASE
                    WHEN score BETWEEN 0 AND 19 THEN '0-19'
                    WHEN score BETWEEN 20 AND 39 THEN '20-39'
                    WHEN score BETWEEN 40 AND 59 THEN '40-59'
                    WHEN score BETWEEN 60 AND 79 THEN '60-79'
                    WHEN score BETWEEN 80 AND 100 THEN '80-100'
                    ELSE 'other'
                END as key,
                COUNT(*) as count
            FROM leads
            GROUP BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Average days from creation to conversion over converted leads.
    pub async fn avg_days_to_conversion(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(AVG(EXTRACT(EPOCH FROM (conversion_date - created_at)) / 86400.0), 0)::float8
            FROM leads
            WHERE status = $1 AND conversion_date IS NOT NULL
            "#,
        )
        .bind(LeadStatus::ClosedWon.as_str())
        .fetch_one(&self.pool)
        .await
    }

    // ========================================================================
    // Deal pipeline
    // ========================================================================

    /// Per-stage rollup, sorted by count descending.
    pub async fn deal_stage_performance(&self) -> Result<Vec<StagePerformanceRow>, sqlx::Error> {
        sqlx::query_as::<_, StagePerformanceRow>(
            r#"
            SELECT
                stage,
                COUNT(*) as count,
                COALESCE(SUM(value), 0)::float8 as total_value,
                COALESCE(AVG(probability), 0)::float8 as avg_probability
            FROM deals
            GROUP BY stage
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Probability-weighted revenue over deals in a non-closed stage.
    pub async fn expected_pipeline_revenue(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(value * probability / 100.0), 0)::float8
            FROM deals
            WHERE stage <> $1 AND stage <> $2
            "#,
        )
        .bind(DealStage::ClosedWon.as_str())
        .bind(DealStage::ClosedLost.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Average days from creation to close over closed-won deals.
    pub async fn avg_deal_cycle_days(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(AVG(EXTRACT(EPOCH FROM (actual_close_date - created_at)) / 86400.0), 0)::float8
            FROM deals
            WHERE stage = $1 AND actual_close_date IS NOT NULL
            "#,
        )
        .bind(DealStage::ClosedWon.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Top open deals by value, joined with owner and customer.
    pub async fn top_open_deals(&self, limit: i64) -> Result<Vec<TopDealRow>, sqlx::Error> {
        sqlx::query_as::<_, TopDealRow>(
            r#"
            SELECT
                d.id,
                d.title,
                d.value::float8 as value,
                d.stage,
                d.probability::float8 as probability,
                d.expected_close_date,
                u.id as owner_id,
                u.first_name as owner_first_name,
                u.last_name as owner_last_name,
                u.email as owner_email,
                c.id as customer_id,
                c.first_name as customer_first_name,
                c.last_name as customer_last_name,
                c.company as customer_company
            FROM deals d
            LEFT JOIN users u ON d.assigned_to = u.id
            LEFT JOIN customers c ON d.customer_id = c.id
            WHERE d.stage <> $1 AND d.stage <> $2
            ORDER BY d.value DESC
            LIMIT $3
            "#,
        )
        .bind(DealStage::ClosedWon.as_str())
        .bind(DealStage::ClosedLost.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    // ========================================================================
    // Customer insights
    // ========================================================================

    /// Customer counts grouped by raw status, sorted by count descending.
    pub async fn customer_status_counts(&self) -> Result<Vec<GroupCountRow>, sqlx::Error> {
        sqlx::query_as::<_, GroupCountRow>(
            r#"
            SELECT status as key, COUNT(*) as count
            FROM customers
            GROUP BY status
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Plan-type rollup over customers with ISP plan data.
    pub async fn plan_type_breakdown(&self) -> Result<Vec<PlanTypeRow>, sqlx::Error> {
        sqlx::query_as::<_, PlanTypeRow>(
            r#"
            SELECT
                plan_type,
                COUNT(*) as count,
                COALESCE(AVG(plan_price), 0)::float8 as avg_price
            FROM customers
            WHERE plan_type IS NOT NULL
            GROUP BY plan_type
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Customer counts grouped by churn-risk band.
    pub async fn churn_risk_counts(&self) -> Result<Vec<GroupCountRow>, sqlx::Error> {
        sqlx::query_as::<_, GroupCountRow>(
            r#"
            SELECT churn_risk as key, COUNT(*) as count
            FROM customers
            WHERE churn_risk IS NOT NULL
            GROUP BY churn_risk
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// NPS survey aggregate. Thresholds assume the 0-10 survey scale:
    /// promoter >= 9, passive 7-8, detractor <= 6.
    pub async fn nps_summary(&self) -> Result<NpsRow, sqlx::Error> {
        sqlx::query_as::<_, NpsRow>(
            r#"
            SELECT
                COUNT(*) as responses,
                COALESCE(AVG(nps_score), 0)::float8 as avg_score,
                COUNT(*) FILTER (WHERE nps_score >= 9) as promoters,
                COUNT(*) FILTER (WHERE nps_score BETWEEN 7 AND 8) as passives,
                COUNT(*) FILTER (WHERE nps_score <= 6) as detractors
            FROM customers
            WHERE nps_score IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    /// Lifetime-value aggregate over customers with a positive lifetime value.
    pub async fn lifetime_value_stats(&self) -> Result<LifetimeValueRow, sqlx::Error> {
        sqlx::query_as::<_, LifetimeValueRow>(
            r#"
            SELECT
                COALESCE(AVG(lifetime_value), 0)::float8 as avg_value,
                COALESCE(SUM(lifetime_value), 0)::float8 as total_value,
                COALESCE(MAX(lifetime_value), 0)::float8 as max_value,
                COALESCE(MIN(lifetime_value), 0)::float8 as min_value
            FROM customers
            WHERE lifetime_value > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    // ========================================================================
    // Team performance
    // ========================================================================

    /// Per-user lead rollup, sorted by converted count descending.
    ///
    /// Unassigned leads carry no user and are omitted.
    pub async fn lead_attribution(&self) -> Result<Vec<LeadAttributionRow>, sqlx::Error> {
        sqlx::query_as::<_, LeadAttributionRow>(
            r#"
            SELECT
                u.id as user_id,
                u.first_name,
                u.last_name,
                COUNT(l.id) as total_leads,
                COUNT(l.id) FILTER (WHERE l.status = $1) as converted
            FROM leads l
            JOIN users u ON l.assigned_to = u.id
            GROUP BY u.id, u.first_name, u.last_name
            ORDER BY converted DESC
            "#,
        )
        .bind(LeadStatus::ClosedWon.as_str())
        .fetch_all(&self.pool)
        .await
    }

    /// Per-user deal rollup, sorted by won revenue descending.
    pub async fn deal_attribution(&self) -> Result<Vec<DealAttributionRow>, sqlx::Error> {
        sqlx::query_as::<_, DealAttributionRow>(
            r#"
            SELECT
                u.id as user_id,
                u.first_name,
                u.last_name,
                COUNT(d.id) as total_deals,
                COUNT(d.id) FILTER (WHERE d.stage = $1) as won,
                COALESCE(SUM(d.value) FILTER (WHERE d.stage = $1), 0)::float8 as revenue
            FROM deals d
            JOIN users u ON d.assigned_to = u.id
            GROUP BY u.id, u.first_name, u.last_name
            ORDER BY revenue DESC
            "#,
        )
        .bind(DealStage::ClosedWon.as_str())
        .fetch_all(&self.pool)
        .await
    }
}
