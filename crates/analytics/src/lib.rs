//! `billable-analytics`: dashboard analytics over freelance business records.
//!
//! Three independent views are derived from tenant-scoped snapshots:
//! - revenue (paid/unpaid trends, status breakdown, year-over-year growth)
//! - time tracking (worked hours, realized rates, utilization)
//! - project profitability (per project and per company)
//!
//! Aggregators are pure and deterministic for a given snapshot and reference
//! instant. [`AnalyticsService`] is the IO boundary: it validates input,
//! fetches through an [`AnalyticsReader`] and hands the snapshot over.

pub mod bucket;
pub mod config;
pub mod error;
pub mod math;
pub mod profitability;
pub mod reader;
pub mod revenue;
pub mod service;
pub mod time_tracking;
pub mod window;

pub use bucket::{Buckets, bucketize};
pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, AnalyticsResult};
pub use profitability::{
    CompanyRollup, ProjectAnalytics, ProjectProfitability, ProjectProfitabilityAggregator,
};
pub use reader::{AnalyticsReader, ReadError};
pub use revenue::{
    MonthlyRevenue, RevenueAggregator, RevenueAnalytics, RevenueTrendPoint, StatusRevenue,
};
pub use service::{AnalyticsService, DashboardAnalytics};
pub use time_tracking::{MonthlyHours, ProjectHours, TimeTrackingAggregator, TimeTrackingAnalytics};
pub use window::{MonthBucket, MonthWindow};
