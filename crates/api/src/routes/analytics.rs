//! Analytics report endpoints.
//!
//! Six read-only reports under `/api/analytics`. Each handler fans its
//! aggregate queries out with `tokio::try_join!`, derives the remaining
//! metrics through `domain::services::reporting`, and wraps the payload in
//! the `{"success": true, "data": ...}` envelope the CRM client consumes.
//!
//! Query parameters are coerced permissively: malformed dates are ignored
//! and malformed month counts fall back to the default. These endpoints
//! never return 400.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use domain::models::{
    CustomerInsightsReport, CustomerOverview, DealLeaderboardEntry, DealOverview,
    DealPipelineReport, LeadLeaderboardEntry, LeadOverview, LeadPerformanceReport,
    LifetimeValueStats, MonthlyAmount, MonthlyCount, MonthlyRevenue, NpsSummary, OverviewMetrics,
    OverviewReport, PlanTypeBreakdown, ReportWindow, RevenueOverview, ScoreBucket,
    SourcePerformance, StagePerformance, StatusCount, TeamPerformanceReport, TopDeal,
    TopDealCustomer, TopDealOwner, TrendsReport,
};
use domain::services::reporting;
use persistence::entities::{MonthBucketRow, TopDealRow};
use persistence::metrics::ReportTimer;
use persistence::repositories::AnalyticsRepository;

use crate::app::AppState;
use crate::error::ApiError;

const DEFAULT_TREND_MONTHS: u32 = 12;
const MAX_TREND_MONTHS: u32 = 120;
const TOP_DEALS_LIMIT: i64 = 5;

/// Success envelope wrapping every report payload.
#[derive(Debug, Serialize)]
pub struct ReportResponse<T> {
    pub success: bool,
    pub data: T,
}

fn report<T>(data: T) -> Json<ReportResponse<T>> {
    Json(ReportResponse {
        success: true,
        data,
    })
}

/// Query parameters for the overview report.
///
/// Dates arrive as strings so malformed values can be dropped instead of
/// failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query parameters for the trends report.
#[derive(Debug, Default, Deserialize)]
pub struct TrendsParams {
    pub months: Option<String>,
}

/// Parse an optional date parameter, accepting RFC 3339 timestamps or plain
/// `YYYY-MM-DD` dates (taken as UTC midnight). Anything else is ignored.
fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Coerce the `months` parameter, clamped to [1, 120], defaulting to 12.
fn parse_months(value: Option<&str>) -> u32 {
    value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| (n as u64).min(MAX_TREND_MONTHS as u64) as u32)
        .unwrap_or(DEFAULT_TREND_MONTHS)
}

fn monthly_counts(rows: Vec<MonthBucketRow>) -> Vec<MonthlyCount> {
    rows.into_iter()
        .map(|row| MonthlyCount {
            year: row.year,
            month: row.month as u32,
            count: row.count,
        })
        .collect()
}

fn top_deal(row: TopDealRow) -> TopDeal {
    let assigned_to = row.owner_id.map(|id| TopDealOwner {
        id,
        name: reporting::display_name(
            row.owner_first_name.as_deref().unwrap_or(""),
            row.owner_last_name.as_deref().unwrap_or(""),
        ),
        email: row.owner_email.unwrap_or_default(),
    });
    let customer = row.customer_id.map(|id| TopDealCustomer {
        id,
        first_name: row.customer_first_name.unwrap_or_default(),
        last_name: row.customer_last_name.unwrap_or_default(),
        company: row.customer_company,
    });

    TopDeal {
        id: row.id,
        title: row.title,
        value: row.value,
        stage: row.stage,
        probability: row.probability,
        expected_close_date: row.expected_close_date,
        assigned_to,
        customer,
    }
}

/// GET /api/analytics/overview
pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> Result<Json<ReportResponse<OverviewReport>>, ApiError> {
    let timer = ReportTimer::new("overview");
    let repo = AnalyticsRepository::new(state.pool.clone());

    let window = ReportWindow::new(
        parse_date(params.start_date.as_deref()),
        parse_date(params.end_date.as_deref()),
    );

    let (customers, leads, deals, total_revenue, monthly_recurring) = tokio::try_join!(
        repo.customer_counts(&window),
        repo.lead_counts(&window),
        repo.deal_counts(&window),
        repo.total_won_revenue(),
        repo.monthly_recurring_revenue(),
    )?;

    let data = OverviewReport {
        customers: CustomerOverview {
            total: customers.total,
            active: customers.active,
            inactive: customers.total - customers.active,
        },
        leads: LeadOverview {
            total: leads.total,
            qualified: leads.qualified,
        },
        deals: DealOverview {
            total: deals.total,
            won: deals.won,
            lost: deals.lost,
        },
        revenue: RevenueOverview {
            total_revenue,
            monthly_recurring,
        },
        metrics: OverviewMetrics {
            conversion_rate: reporting::percentage(deals.won, leads.total),
            win_rate: reporting::percentage(deals.won, deals.total),
            avg_deal_size: reporting::safe_average(total_revenue, deals.won),
        },
    };

    timer.record();
    Ok(report(data))
}

/// GET /api/analytics/trends
pub async fn trends(
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> Result<Json<ReportResponse<TrendsReport>>, ApiError> {
    let timer = ReportTimer::new("trends");
    let repo = AnalyticsRepository::new(state.pool.clone());

    let months = parse_months(params.months.as_deref());
    let now = Utc::now();
    let since = now.checked_sub_months(Months::new(months)).unwrap_or(now);

    let (customers, leads, won_deals) = tokio::try_join!(
        repo.customers_by_month(since),
        repo.leads_by_month(since),
        repo.won_deals_by_month(since),
    )?;

    let revenue = won_deals
        .iter()
        .map(|row| MonthlyAmount {
            year: row.year,
            month: row.month as u32,
            revenue: row.revenue,
        })
        .collect();
    let deals = won_deals
        .into_iter()
        .map(|row| MonthlyRevenue {
            year: row.year,
            month: row.month as u32,
            count: row.count,
            revenue: row.revenue,
        })
        .collect();

    let data = TrendsReport {
        months,
        customers: monthly_counts(customers),
        leads: monthly_counts(leads),
        deals,
        revenue,
    };

    timer.record();
    Ok(report(data))
}

/// GET /api/analytics/lead-performance
pub async fn lead_performance(
    State(state): State<AppState>,
) -> Result<Json<ReportResponse<LeadPerformanceReport>>, ApiError> {
    let timer = ReportTimer::new("lead_performance");
    let repo = AnalyticsRepository::new(state.pool.clone());

    let (by_source, by_status, histogram, avg_days) = tokio::try_join!(
        repo.lead_source_performance(),
        repo.lead_status_counts(),
        repo.lead_score_histogram(),
        repo.avg_days_to_conversion(),
    )?;

    let sparse: Vec<(String, i64)> = histogram
        .into_iter()
        .map(|row| (row.key, row.count))
        .collect();
    let score_distribution: Vec<ScoreBucket> = reporting::fill_score_buckets(&sparse);

    let data = LeadPerformanceReport {
        by_source: by_source
            .into_iter()
            .map(|row| SourcePerformance {
                source: row.source,
                count: row.count,
                qualified: row.qualified,
                converted: row.converted,
                total_estimated_value: row.total_estimated_value,
            })
            .collect(),
        by_status: by_status
            .into_iter()
            .map(|row| StatusCount {
                status: row.key,
                count: row.count,
            })
            .collect(),
        score_distribution,
        avg_days_to_conversion: reporting::round2(avg_days),
    };

    timer.record();
    Ok(report(data))
}

/// GET /api/analytics/deal-pipeline
pub async fn deal_pipeline(
    State(state): State<AppState>,
) -> Result<Json<ReportResponse<DealPipelineReport>>, ApiError> {
    let timer = ReportTimer::new("deal_pipeline");
    let repo = AnalyticsRepository::new(state.pool.clone());

    let (by_stage, expected_revenue, avg_cycle_days, top_deals) = tokio::try_join!(
        repo.deal_stage_performance(),
        repo.expected_pipeline_revenue(),
        repo.avg_deal_cycle_days(),
        repo.top_open_deals(TOP_DEALS_LIMIT),
    )?;

    let data = DealPipelineReport {
        by_stage: by_stage
            .into_iter()
            .map(|row| StagePerformance {
                stage: row.stage,
                count: row.count,
                total_value: row.total_value,
                avg_probability: reporting::round2(row.avg_probability),
            })
            .collect(),
        expected_revenue: reporting::round2(expected_revenue),
        avg_cycle_days: reporting::round2(avg_cycle_days),
        top_open_deals: top_deals.into_iter().map(top_deal).collect(),
    };

    timer.record();
    Ok(report(data))
}

/// GET /api/analytics/customer-insights
pub async fn customer_insights(
    State(state): State<AppState>,
) -> Result<Json<ReportResponse<CustomerInsightsReport>>, ApiError> {
    let timer = ReportTimer::new("customer_insights");
    let repo = AnalyticsRepository::new(state.pool.clone());

    let (by_status, by_plan_type, by_churn_risk, nps, ltv) = tokio::try_join!(
        repo.customer_status_counts(),
        repo.plan_type_breakdown(),
        repo.churn_risk_counts(),
        repo.nps_summary(),
        repo.lifetime_value_stats(),
    )?;

    let data = CustomerInsightsReport {
        by_status: by_status
            .into_iter()
            .map(|row| StatusCount {
                status: row.key,
                count: row.count,
            })
            .collect(),
        by_plan_type: by_plan_type
            .into_iter()
            .map(|row| PlanTypeBreakdown {
                plan_type: row.plan_type,
                count: row.count,
                avg_price: reporting::round2(row.avg_price),
            })
            .collect(),
        by_churn_risk: by_churn_risk
            .into_iter()
            .map(|row| StatusCount {
                status: row.key,
                count: row.count,
            })
            .collect(),
        nps: NpsSummary {
            avg_score: reporting::round2(nps.avg_score),
            promoters: nps.promoters,
            passives: nps.passives,
            detractors: nps.detractors,
            responses: nps.responses,
            nps_score: reporting::nps_composite(nps.promoters, nps.detractors, nps.responses),
        },
        lifetime_value: LifetimeValueStats {
            avg: reporting::round2(ltv.avg_value),
            total: ltv.total_value,
            max: ltv.max_value,
            min: ltv.min_value,
        },
    };

    timer.record();
    Ok(report(data))
}

/// GET /api/analytics/team-performance
pub async fn team_performance(
    State(state): State<AppState>,
) -> Result<Json<ReportResponse<TeamPerformanceReport>>, ApiError> {
    let timer = ReportTimer::new("team_performance");
    let repo = AnalyticsRepository::new(state.pool.clone());

    let (leads, deals) = tokio::try_join!(repo.lead_attribution(), repo.deal_attribution())?;

    let data = TeamPerformanceReport {
        leads: leads
            .into_iter()
            .map(|row| LeadLeaderboardEntry {
                user_id: row.user_id,
                name: reporting::display_name(&row.first_name, &row.last_name),
                total_leads: row.total_leads,
                converted: row.converted,
                conversion_rate: reporting::percentage(row.converted, row.total_leads),
            })
            .collect(),
        deals: deals
            .into_iter()
            .map(|row| DealLeaderboardEntry {
                user_id: row.user_id,
                name: reporting::display_name(&row.first_name, &row.last_name),
                total_deals: row.total_deals,
                won: row.won,
                revenue: row.revenue,
                win_rate: reporting::percentage(row.won, row.total_deals),
            })
            .collect(),
    };

    timer.record();
    Ok(report(data))
}
