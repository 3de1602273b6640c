//! Revenue analytics over invoice snapshots.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use billable_core::CompanyId;
use billable_records::{Invoice, InvoiceStatus};

use crate::bucket::bucketize;
use crate::math::{growth_percentage, ratio};
use crate::window::MonthWindow;

/// Paid revenue for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub key: String,
    pub revenue: u64,
    pub invoice_count: u64,
}

/// Paid vs. unpaid invoiced amounts for one month.
///
/// Invariant: `total == paid + unpaid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueTrendPoint {
    pub month: String,
    pub key: String,
    pub paid: u64,
    pub unpaid: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRevenue {
    pub status: InvoiceStatus,
    pub amount: u64,
    pub count: u64,
}

/// Revenue view of the dashboard. Amounts are in smallest currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueAnalytics {
    /// All-time paid revenue.
    pub total_revenue: u64,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub monthly_revenue_trend: Vec<RevenueTrendPoint>,
    pub revenue_by_status: Vec<StatusRevenue>,
    pub average_invoice_value: f64,
    pub year_over_year_growth: f64,
    pub invoice_count: u64,
}

/// Computes [`RevenueAnalytics`] for a fixed reference instant and window.
#[derive(Debug, Clone)]
pub struct RevenueAggregator {
    today: NaiveDate,
    window: MonthWindow,
}

impl RevenueAggregator {
    pub fn new(now: DateTime<Utc>, window: MonthWindow) -> Self {
        Self {
            today: now.date_naive(),
            window,
        }
    }

    pub fn window(&self) -> &MonthWindow {
        &self.window
    }

    /// Aggregate `invoices`, keeping only those associated with `contractor`
    /// when a filter is given.
    pub fn aggregate(
        &self,
        invoices: &[Invoice],
        contractor: Option<CompanyId>,
    ) -> RevenueAnalytics {
        let invoices: Vec<&Invoice> = invoices
            .iter()
            .filter(|inv| contractor.is_none_or(|c| inv.involves(c)))
            .collect();

        let mut total_revenue = 0u64;
        let mut all_amount = 0u64;
        // First-appearance order; at most one entry per status.
        let mut revenue_by_status: Vec<StatusRevenue> =
            Vec::with_capacity(InvoiceStatus::ALL.len());

        for inv in &invoices {
            if inv.is_paid() {
                total_revenue = total_revenue.saturating_add(inv.total_amount);
            }
            all_amount = all_amount.saturating_add(inv.total_amount);

            match revenue_by_status.iter_mut().find(|s| s.status == inv.status) {
                Some(entry) => {
                    entry.amount = entry.amount.saturating_add(inv.total_amount);
                    entry.count += 1;
                }
                None => revenue_by_status.push(StatusRevenue {
                    status: inv.status,
                    amount: inv.total_amount,
                    count: 1,
                }),
            }
        }

        let buckets = bucketize(&self.window, invoices.iter().copied(), |inv| inv.issue_date);

        let monthly_revenue = buckets.map(|bucket, group| {
            let (revenue, invoice_count) = group
                .iter()
                .filter(|inv| inv.is_paid())
                .fold((0u64, 0u64), |(sum, n), inv| (sum.saturating_add(inv.total_amount), n + 1));
            MonthlyRevenue {
                month: bucket.label.clone(),
                key: bucket.key.clone(),
                revenue,
                invoice_count,
            }
        });

        let monthly_revenue_trend = buckets.map(|bucket, group| {
            let (paid, unpaid) = group.iter().fold((0u64, 0u64), |(paid, unpaid), inv| {
                if inv.is_paid() {
                    (paid.saturating_add(inv.total_amount), unpaid)
                } else {
                    (paid, unpaid.saturating_add(inv.total_amount))
                }
            });
            RevenueTrendPoint {
                month: bucket.label.clone(),
                key: bucket.key.clone(),
                paid,
                unpaid,
                total: paid.saturating_add(unpaid),
            }
        });

        let invoice_count = invoices.len() as u64;

        RevenueAnalytics {
            total_revenue,
            monthly_revenue,
            monthly_revenue_trend,
            revenue_by_status,
            average_invoice_value: ratio(all_amount as f64, invoice_count as f64),
            year_over_year_growth: self.year_over_year_growth(&invoices),
            invoice_count,
        }
    }

    /// Paid revenue in `[today-12mo, today]` against `[today-24mo, today-12mo)`.
    fn year_over_year_growth(&self, invoices: &[&Invoice]) -> f64 {
        let year_ago = self
            .today
            .checked_sub_months(Months::new(12))
            .unwrap_or(NaiveDate::MIN);
        let two_years_ago = self
            .today
            .checked_sub_months(Months::new(24))
            .unwrap_or(NaiveDate::MIN);

        let mut current = 0u64;
        let mut prior = 0u64;
        for inv in invoices.iter().filter(|inv| inv.is_paid()) {
            let d = inv.issue_date;
            if year_ago <= d && d <= self.today {
                current = current.saturating_add(inv.total_amount);
            } else if two_years_ago <= d && d < year_ago {
                prior = prior.saturating_add(inv.total_amount);
            }
        }

        growth_percentage(current, prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billable_core::{InvoiceId, TenantId};
    use billable_records::{Company, CompanyKind};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn aggregator() -> RevenueAggregator {
        let now = test_now();
        RevenueAggregator::new(now, MonthWindow::trailing(now, 6).unwrap())
    }

    fn invoice(
        tenant_id: TenantId,
        status: InvoiceStatus,
        total: u64,
        issued: NaiveDate,
    ) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            tenant_id,
            status,
            issue_date: issued,
            due_date: issued,
            subtotal_amount: total,
            tax_rate: 0.0,
            total_amount: total,
            companies: Vec::new(),
            items: Vec::new(),
        }
    }

    fn trend_for<'a>(r: &'a RevenueAnalytics, key: &str) -> &'a RevenueTrendPoint {
        r.monthly_revenue_trend.iter().find(|p| p.key == key).unwrap()
    }

    #[test]
    fn paid_and_sent_in_same_month() {
        let t = TenantId::new();
        let invoices = vec![
            invoice(t, InvoiceStatus::Paid, 100, date(2024, 1, 15)),
            invoice(t, InvoiceStatus::Sent, 50, date(2024, 1, 20)),
        ];

        let r = aggregator().aggregate(&invoices, None);

        assert_eq!(
            r.revenue_by_status,
            vec![
                StatusRevenue { status: InvoiceStatus::Paid, amount: 100, count: 1 },
                StatusRevenue { status: InvoiceStatus::Sent, amount: 50, count: 1 },
            ]
        );
        assert_eq!(r.total_revenue, 100);

        let jan = trend_for(&r, "2024-01");
        assert_eq!((jan.paid, jan.unpaid, jan.total), (100, 50, 150));
        assert_eq!(jan.month, "Jan 2024");

        let jan_paid = r.monthly_revenue.iter().find(|m| m.key == "2024-01").unwrap();
        assert_eq!((jan_paid.revenue, jan_paid.invoice_count), (100, 1));
        assert_eq!(r.average_invoice_value, 75.0);
    }

    #[test]
    fn empty_snapshot_yields_dense_zero_series() {
        let r = aggregator().aggregate(&[], None);

        assert_eq!(r.total_revenue, 0);
        assert_eq!(r.monthly_revenue.len(), 6);
        assert_eq!(r.monthly_revenue_trend.len(), 6);
        assert!(r.monthly_revenue_trend.iter().all(|p| p.total == 0));
        assert!(r.revenue_by_status.is_empty());
        assert_eq!(r.average_invoice_value, 0.0);
        assert_eq!(r.year_over_year_growth, 0.0);
    }

    #[test]
    fn total_revenue_is_all_time_while_series_is_windowed() {
        let t = TenantId::new();
        let invoices = vec![
            invoice(t, InvoiceStatus::Paid, 1_000, date(2019, 6, 1)),
            invoice(t, InvoiceStatus::Paid, 200, date(2024, 2, 1)),
        ];

        let r = aggregator().aggregate(&invoices, None);

        assert_eq!(r.total_revenue, 1_200);
        let windowed: u64 = r.monthly_revenue.iter().map(|m| m.revenue).sum();
        assert_eq!(windowed, 200);
        assert_eq!(r.invoice_count, 2);
    }

    #[test]
    fn contractor_filter_applies_before_everything() {
        let t = TenantId::new();
        let me = Company::new(t, "Me Ltd", [CompanyKind::Contractor]);
        let other = Company::new(t, "Other Ltd", [CompanyKind::Contractor]);

        let mut mine = invoice(t, InvoiceStatus::Paid, 300, date(2024, 3, 1));
        mine.companies.push(me.clone());
        let mut theirs = invoice(t, InvoiceStatus::Draft, 700, date(2024, 3, 2));
        theirs.companies.push(other);

        let r = aggregator().aggregate(&[mine, theirs], Some(me.id));

        assert_eq!(r.invoice_count, 1);
        assert_eq!(r.total_revenue, 300);
        assert_eq!(r.revenue_by_status.len(), 1);
        assert_eq!(trend_for(&r, "2024-03").total, 300);
    }

    #[test]
    fn year_over_year_compares_trailing_twelve_months() {
        let t = TenantId::new();
        let invoices = vec![
            // current: [2023-03-15, 2024-03-15]
            invoice(t, InvoiceStatus::Paid, 150, date(2023, 3, 15)),
            // prior: [2022-03-15, 2023-03-15)
            invoice(t, InvoiceStatus::Paid, 100, date(2023, 3, 14)),
            invoice(t, InvoiceStatus::Paid, 999, date(2022, 3, 14)),
            // unpaid never counts
            invoice(t, InvoiceStatus::Overdue, 5_000, date(2023, 1, 1)),
        ];

        let r = aggregator().aggregate(&invoices, None);
        assert_eq!(r.year_over_year_growth, 50.0);
    }

    #[test]
    fn year_over_year_without_prior_revenue_is_zero() {
        let t = TenantId::new();
        let invoices = vec![invoice(t, InvoiceStatus::Paid, 10_000, date(2024, 1, 1))];

        let r = aggregator().aggregate(&invoices, None);
        assert_eq!(r.year_over_year_growth, 0.0);
    }

    fn arb_status() -> impl Strategy<Value = InvoiceStatus> {
        prop::sample::select(InvoiceStatus::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: per-bucket trend totals equal paid + unpaid and equal the
        /// unconditional sum of invoices in the bucket; status counts cover every invoice.
        #[test]
        fn trend_and_status_breakdown_are_consistent(
            rows in prop::collection::vec((arb_status(), 0u64..1_000_000, 0i64..400), 0..60)
        ) {
            let t = TenantId::new();
            let invoices: Vec<Invoice> = rows
                .iter()
                .map(|(status, total, back)| {
                    invoice(t, *status, *total, date(2024, 3, 15) - chrono::Duration::days(*back))
                })
                .collect();

            let agg = aggregator();
            let r = agg.aggregate(&invoices, None);

            for point in &r.monthly_revenue_trend {
                prop_assert_eq!(point.total, point.paid + point.unpaid);
                let bucket = agg
                    .window()
                    .buckets()
                    .iter()
                    .find(|b| b.key == point.key)
                    .unwrap();
                let unconditional: u64 = invoices
                    .iter()
                    .filter(|inv| bucket.contains(inv.issue_date))
                    .map(|inv| inv.total_amount)
                    .sum();
                prop_assert_eq!(point.total, unconditional);
            }

            let counted: u64 = r.revenue_by_status.iter().map(|s| s.count).sum();
            prop_assert_eq!(counted, invoices.len() as u64);
            prop_assert!(r.average_invoice_value.is_finite());
            prop_assert!(r.year_over_year_growth.is_finite());
        }
    }
}
