use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use tracing::info;

use billable_analytics::{AnalyticsConfig, AnalyticsService};
use billable_core::{CompanyId, TenantId};
use billable_infra::{InMemoryRecordStore, RecordSnapshot};

/// Compute dashboard analytics from a record snapshot
#[derive(Debug, Parser)]
#[command(name = "billable-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON snapshot: {"invoices": [...], "projects": [...]}
    snapshot: PathBuf,

    /// Tenant to report on
    #[arg(long)]
    tenant: TenantId,

    /// Restrict revenue and time views to one company
    #[arg(long)]
    contractor: Option<CompanyId>,

    /// Reference instant (RFC 3339); defaults to the current time
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Which view to print
    #[arg(long, value_enum, default_value_t = View::Dashboard)]
    view: View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Revenue,
    Time,
    Projects,
    Dashboard,
}

impl Cli {
    /// Load the snapshot, compute the requested view and render it as pretty JSON.
    pub fn run(&self) -> anyhow::Result<String> {
        let raw = std::fs::read_to_string(&self.snapshot)
            .with_context(|| format!("reading snapshot {}", self.snapshot.display()))?;
        let snapshot: RecordSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", self.snapshot.display()))?;
        let store = InMemoryRecordStore::from_snapshot(snapshot)?;

        let service = AnalyticsService::with_config(store, AnalyticsConfig::from_env())?;
        let now = self.now.unwrap_or_else(Utc::now);
        info!(tenant = %self.tenant, view = ?self.view, %now, "computing analytics");

        let json = match self.view {
            View::Revenue => serde_json::to_string_pretty(
                &service.compute_revenue_analytics(self.tenant, self.contractor, now)?,
            )?,
            View::Time => serde_json::to_string_pretty(
                &service.compute_time_tracking_analytics(self.tenant, self.contractor, now)?,
            )?,
            View::Projects => {
                serde_json::to_string_pretty(&service.compute_project_analytics(self.tenant)?)?
            }
            View::Dashboard => serde_json::to_string_pretty(
                &service.compute_dashboard(self.tenant, self.contractor, now)?,
            )?,
        };
        Ok(json)
    }
}
