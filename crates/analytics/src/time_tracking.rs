//! Time tracking analytics: worked hours, realized rates and utilization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use billable_core::CompanyId;
use billable_records::TrackedTime;

use crate::bucket::bucketize;
use crate::math::{percentage, ratio};
use crate::window::MonthWindow;

/// Default weekly capacity used for utilization.
pub const DEFAULT_WEEKLY_CAPACITY_HOURS: f64 = 40.0;

/// Hours and realized revenue for one project name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectHours {
    pub project: String,
    /// Shadow (actually worked) hours.
    pub hours: f64,
    pub billed_hours: f64,
    /// `shadow_hours * hourly_rate` over entries whose invoice is paid.
    pub revenue: u64,
    /// `billed_hours / hours * 100`, 0 without worked hours.
    pub efficiency: f64,
    /// `revenue / hours`, 0 without worked hours.
    pub effective_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyHours {
    pub month: String,
    pub key: String,
    pub hours: f64,
    pub billed_hours: f64,
}

/// Time tracking view of the dashboard, restricted to the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTrackingAnalytics {
    pub total_hours: f64,
    pub total_billed_hours: f64,
    pub hours_by_project: Vec<ProjectHours>,
    pub hours_by_month: Vec<MonthlyHours>,
    /// Paid revenue per worked hour (smallest currency unit).
    pub average_hourly_rate: f64,
    /// Worked hours against `weeks * weekly_capacity_hours`, as a percentage.
    pub utilization_rate: f64,
    pub entry_count: u64,
}

#[derive(Debug, Default)]
struct ProjectAcc {
    hours: f64,
    billed_hours: f64,
    revenue: u64,
}

/// Computes [`TimeTrackingAnalytics`] over a fixed window.
#[derive(Debug, Clone)]
pub struct TimeTrackingAggregator {
    window: MonthWindow,
    weekly_capacity_hours: f64,
}

impl TimeTrackingAggregator {
    pub fn new(window: MonthWindow) -> Self {
        Self {
            window,
            weekly_capacity_hours: DEFAULT_WEEKLY_CAPACITY_HOURS,
        }
    }

    /// Non-positive or non-finite capacity is ignored so utilization always
    /// has a positive denominator.
    pub fn with_weekly_capacity(mut self, hours: f64) -> Self {
        if hours.is_finite() && hours > 0.0 {
            self.weekly_capacity_hours = hours;
        } else {
            warn!(hours, "ignoring invalid weekly capacity");
        }
        self
    }

    /// Capacity denominator for utilization: `weeks * weekly_capacity_hours`.
    pub fn capacity_hours(&self) -> f64 {
        self.window.weeks() * self.weekly_capacity_hours
    }

    /// Aggregate windowed entries, keeping only projects associated with
    /// `contractor` when a filter is given.
    pub fn aggregate(
        &self,
        entries: &[TrackedTime],
        contractor: Option<CompanyId>,
    ) -> TimeTrackingAnalytics {
        let entries: Vec<&TrackedTime> = entries
            .iter()
            .filter(|t| contractor.is_none_or(|c| t.project.has_company(c)))
            .filter(|t| self.window.contains(t.entry.date))
            .collect();

        let mut total_hours = 0.0;
        let mut total_billed_hours = 0.0;
        let mut paid_revenue = 0u64;
        let mut by_project: BTreeMap<&str, ProjectAcc> = BTreeMap::new();

        for t in &entries {
            let worked = t.entry.worked_hours();
            let paid = if t.entry.is_paid() { t.entry.worked_amount() } else { 0 };

            total_hours += worked;
            total_billed_hours += t.entry.billed_hours;
            paid_revenue = paid_revenue.saturating_add(paid);

            let acc = by_project.entry(t.project.name.as_str()).or_default();
            acc.hours += worked;
            acc.billed_hours += t.entry.billed_hours;
            acc.revenue = acc.revenue.saturating_add(paid);
        }

        let mut hours_by_project: Vec<ProjectHours> = by_project
            .into_iter()
            .map(|(name, acc)| ProjectHours {
                project: name.to_string(),
                hours: acc.hours,
                billed_hours: acc.billed_hours,
                revenue: acc.revenue,
                efficiency: percentage(acc.billed_hours, acc.hours),
                effective_rate: ratio(acc.revenue as f64, acc.hours),
            })
            .collect();
        // BTreeMap already yields name order; a stable sort keeps it for ties.
        hours_by_project.sort_by(|a, b| b.hours.total_cmp(&a.hours));

        let hours_by_month = bucketize(&self.window, entries.iter().copied(), |t| t.entry.date)
            .map(|bucket, group| MonthlyHours {
                month: bucket.label.clone(),
                key: bucket.key.clone(),
                hours: group.iter().map(|t| t.entry.worked_hours()).sum(),
                billed_hours: group.iter().map(|t| t.entry.billed_hours).sum(),
            });

        TimeTrackingAnalytics {
            total_hours,
            total_billed_hours,
            hours_by_project,
            hours_by_month,
            average_hourly_rate: ratio(paid_revenue as f64, total_hours),
            utilization_rate: percentage(total_hours, self.capacity_hours()),
            entry_count: entries.len() as u64,
        }
    }
}
