//! Domain models.

pub mod analytics;
pub mod crm;

pub use analytics::{
    CustomerInsightsReport, CustomerOverview, DealLeaderboardEntry, DealOverview,
    DealPipelineReport, LeadLeaderboardEntry, LeadOverview, LeadPerformanceReport,
    LifetimeValueStats, MonthlyAmount, MonthlyCount, MonthlyRevenue, NpsSummary, OverviewMetrics,
    OverviewReport, PlanTypeBreakdown, ReportWindow, RevenueOverview, ScoreBucket,
    SourcePerformance, StagePerformance, StatusCount, TeamPerformanceReport, TopDeal,
    TopDealCustomer, TopDealOwner, TrendsReport,
};
pub use crm::{ChurnRisk, CustomerStatus, DealStage, LeadStatus};
