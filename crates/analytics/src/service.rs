//! Query entry points: fetch a tenant snapshot, then run the pure aggregators.

use std::thread::ScopedJoinHandle;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use billable_core::{CompanyId, DomainError, Entity, TenantId, TenantOwned};

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::profitability::{ProjectAnalytics, ProjectProfitabilityAggregator};
use crate::reader::AnalyticsReader;
use crate::revenue::{RevenueAggregator, RevenueAnalytics};
use crate::time_tracking::{TimeTrackingAggregator, TimeTrackingAnalytics};
use crate::window::MonthWindow;

/// All three dashboard views computed against the same reference instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAnalytics {
    pub generated_at: DateTime<Utc>,
    pub revenue: RevenueAnalytics,
    pub time_tracking: TimeTrackingAnalytics,
    pub projects: ProjectAnalytics,
}

/// Analytics queries over a tenant's records.
///
/// Either returns a fully populated result or the originating error; nothing
/// is computed from a failed or foreign-tenant fetch.
#[derive(Debug, Clone)]
pub struct AnalyticsService<R> {
    reader: R,
    config: AnalyticsConfig,
}

impl<R> AnalyticsService<R>
where
    R: AnalyticsReader,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            config: AnalyticsConfig::default(),
        }
    }

    pub fn with_config(reader: R, config: AnalyticsConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self { reader, config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn compute_revenue_analytics(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<RevenueAnalytics> {
        ensure_tenant(tenant_id)?;
        let window = MonthWindow::trailing(now, self.config.window_months)?;

        let invoices = self.reader.list_invoices(tenant_id, contractor)?;
        ensure_isolated(tenant_id, &invoices, "invoice")?;
        debug!(tenant = %tenant_id, invoices = invoices.len(), "fetched invoice snapshot");

        Ok(RevenueAggregator::new(now, window).aggregate(&invoices, contractor))
    }

    pub fn compute_time_tracking_analytics(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<TimeTrackingAnalytics> {
        ensure_tenant(tenant_id)?;
        let window = MonthWindow::trailing(now, self.config.window_months)?;

        let entries = self
            .reader
            .list_time_entries(tenant_id, contractor, Some(window.start()))?;
        ensure_isolated(tenant_id, &entries, "time entry")?;
        debug!(tenant = %tenant_id, entries = entries.len(), "fetched time entry snapshot");

        Ok(TimeTrackingAggregator::new(window)
            .with_weekly_capacity(self.config.weekly_capacity_hours)
            .aggregate(&entries, contractor))
    }

    pub fn compute_project_analytics(
        &self,
        tenant_id: TenantId,
    ) -> AnalyticsResult<ProjectAnalytics> {
        ensure_tenant(tenant_id)?;

        let projects = self.reader.list_projects(tenant_id)?;
        ensure_isolated(tenant_id, &projects, "project")?;
        debug!(tenant = %tenant_id, projects = projects.len(), "fetched project snapshot");

        Ok(ProjectProfitabilityAggregator::new().aggregate(&projects))
    }

    /// Compute the three views concurrently.
    ///
    /// The views are independent; on failure the first error in the order
    /// revenue, time tracking, projects is returned.
    pub fn compute_dashboard(
        &self,
        tenant_id: TenantId,
        contractor: Option<CompanyId>,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<DashboardAnalytics> {
        ensure_tenant(tenant_id)?;

        let (revenue, time_tracking, projects) = std::thread::scope(|s| {
            let revenue = s.spawn(|| self.compute_revenue_analytics(tenant_id, contractor, now));
            let time_tracking =
                s.spawn(|| self.compute_time_tracking_analytics(tenant_id, contractor, now));
            let projects = self.compute_project_analytics(tenant_id);
            (join_view(revenue), join_view(time_tracking), projects)
        });

        let dashboard = DashboardAnalytics {
            generated_at: now,
            revenue: revenue?,
            time_tracking: time_tracking?,
            projects: projects?,
        };
        info!(
            tenant = %tenant_id,
            invoices = dashboard.revenue.invoice_count,
            entries = dashboard.time_tracking.entry_count,
            projects = dashboard.projects.project_profitability.len(),
            "dashboard analytics computed"
        );
        Ok(dashboard)
    }
}

fn join_view<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

fn ensure_tenant(tenant_id: TenantId) -> AnalyticsResult<()> {
    if tenant_id.is_nil() {
        warn!("rejected analytics request without tenant");
        return Err(DomainError::validation("tenant id is required").into());
    }
    Ok(())
}

fn ensure_isolated<T: TenantOwned>(
    tenant_id: TenantId,
    records: &[T],
    kind: &str,
) -> AnalyticsResult<()> {
    if let Some(foreign) = records.iter().find(|r| !r.belongs_to(tenant_id)) {
        warn!(
            tenant = %tenant_id,
            foreign = %foreign.tenant_id(),
            kind,
            "reader crossed tenant boundary"
        );
        return Err(AnalyticsError::TenantIsolation(format!(
            "{kind} {:?} belongs to tenant {}, requested {tenant_id}",
            foreign.id(),
            foreign.tenant_id()
        )));
    }
    Ok(())
}
