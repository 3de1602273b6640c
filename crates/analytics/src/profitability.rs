//! Per-project profitability and per-company rollups.
//!
//! No cost model exists: profit is realized (paid) revenue.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use billable_core::{CompanyId, ProjectId};
use billable_records::Project;

use crate::math::percentage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProfitability {
    pub project_id: ProjectId,
    pub project: String,
    pub currency: String,
    /// All-time billed hours.
    pub hours: f64,
    /// `billed_hours * hourly_rate` over entries whose invoice is paid.
    pub revenue: u64,
    pub profit: u64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRollup {
    pub company_id: CompanyId,
    pub company: String,
    pub project_count: u64,
    pub revenue: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    pub project_profitability: Vec<ProjectProfitability>,
    pub projects_by_company: Vec<CompanyRollup>,
    /// Σ project revenue (each project counted once).
    pub total_revenue: u64,
}

/// Computes [`ProjectAnalytics`]. Unwindowed: every entry of every project counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectProfitabilityAggregator;

impl ProjectProfitabilityAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, projects: &[Project]) -> ProjectAnalytics {
        let mut project_profitability = Vec::with_capacity(projects.len());
        let mut by_company: BTreeMap<CompanyId, CompanyRollup> = BTreeMap::new();
        let mut total_revenue = 0u64;

        for project in projects {
            let (hours, revenue) = project_totals(project);
            total_revenue = total_revenue.saturating_add(revenue);

            project_profitability.push(ProjectProfitability {
                project_id: project.id,
                project: project.name.clone(),
                currency: project.currency.clone(),
                hours,
                revenue,
                profit: revenue,
                profit_margin: percentage(revenue as f64, revenue as f64),
            });

            // Fan out: each associated company gets the full project revenue.
            let mut seen = BTreeSet::new();
            for company in project.companies.iter().filter(|c| seen.insert(c.id)) {
                let rollup = by_company.entry(company.id).or_insert_with(|| CompanyRollup {
                    company_id: company.id,
                    company: company.name.clone(),
                    project_count: 0,
                    revenue: 0,
                });
                rollup.project_count += 1;
                rollup.revenue = rollup.revenue.saturating_add(revenue);
            }
        }

        project_profitability.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.project.cmp(&b.project))
        });

        let mut projects_by_company: Vec<CompanyRollup> = by_company.into_values().collect();
        projects_by_company.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.company.cmp(&b.company))
        });

        ProjectAnalytics {
            project_profitability,
            projects_by_company,
            total_revenue,
        }
    }
}

/// `(billed hours, paid billed revenue)` over every entry of `project`.
fn project_totals(project: &Project) -> (f64, u64) {
    project
        .time_entries
        .iter()
        .fold((0.0, 0u64), |(hours, revenue), entry| {
            let paid = if entry.is_paid() { entry.billed_amount() } else { 0 };
            (hours + entry.billed_hours, revenue.saturating_add(paid))
        })
}
