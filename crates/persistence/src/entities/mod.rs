//! Database entity definitions.
//!
//! Entities are typed mappings of aggregate query result rows. Keeping every
//! report row shape as a named struct is what catches field/stage mismatches
//! at compile time instead of at serialization time.

pub mod analytics;

pub use analytics::{
    CustomerCountsRow, DealAttributionRow, DealCountsRow, GroupCountRow, LeadAttributionRow,
    LeadCountsRow, LifetimeValueRow, MonthBucketRow, MonthRevenueRow, NpsRow, PlanTypeRow,
    SourcePerformanceRow, StagePerformanceRow, TopDealRow,
};
