//! Calendar-month windows for dense time series.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use billable_core::{DomainError, DomainResult};

/// One calendar month, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// Display label, e.g. `"Jan 2024"`. Never compared.
    pub label: String,
    /// Stable sort/lookup key, e.g. `"2024-01"`.
    pub key: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthBucket {
    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> DomainResult<Self> {
        let start = first_of_month(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| DomainError::validation(format!("month of {date} is out of range")))?;

        Ok(Self {
            label: start.format("%b %Y").to_string(),
            key: start.format("%Y-%m").to_string(),
            start,
            end,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}

/// Ordered, contiguous run of month buckets, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    buckets: Vec<MonthBucket>,
}

impl MonthWindow {
    pub const DEFAULT_MONTHS: u32 = 6;

    /// Trailing window of `months` buckets ending with the month of `now` (UTC).
    pub fn trailing(now: DateTime<Utc>, months: u32) -> DomainResult<Self> {
        Self::trailing_from(now.date_naive(), months)
    }

    /// Trailing window of `months` buckets ending with the month of `today`.
    pub fn trailing_from(today: NaiveDate, months: u32) -> DomainResult<Self> {
        if months == 0 {
            return Err(DomainError::validation("window must span at least one month"));
        }

        let first = first_of_month(today)
            .checked_sub_months(Months::new(months - 1))
            .ok_or_else(|| DomainError::validation("window start is out of range"))?;

        Self::from_first(first, months)
    }

    /// Explicit window spanning every calendar month touched by `[start, end]`.
    ///
    /// Bounds given in reverse order are swapped.
    pub fn between(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let span = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
        let months = u32::try_from(span + 1)
            .map_err(|_| DomainError::validation("window span is out of range"))?;

        Self::from_first(first_of_month(start), months)
    }

    fn from_first(first: NaiveDate, months: u32) -> DomainResult<Self> {
        let mut buckets = Vec::with_capacity(months as usize);
        let mut cursor = first;
        for i in 0..months {
            let bucket = MonthBucket::containing(cursor)?;
            if i + 1 < months {
                cursor = bucket
                    .end
                    .succ_opt()
                    .ok_or_else(|| DomainError::validation("window end is out of range"))?;
            }
            buckets.push(bucket);
        }
        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[MonthBucket] {
        &self.buckets
    }

    /// Number of months in the window (always >= 1).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// First day of the oldest bucket.
    pub fn start(&self) -> NaiveDate {
        self.buckets.first().map(|b| b.start).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the newest bucket.
    pub fn end(&self) -> NaiveDate {
        self.buckets.last().map(|b| b.end).unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        !self.buckets.is_empty() && self.start() <= date && date <= self.end()
    }

    /// Index of the bucket containing `date`, if inside the window.
    pub fn bucket_index(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        self.buckets
            .binary_search_by(|b| {
                if b.end < date {
                    core::cmp::Ordering::Less
                } else if b.start > date {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    /// Window length in weeks, using a fixed 52 weeks per 12 months.
    pub fn weeks(&self) -> f64 {
        self.buckets.len() as f64 * 52.0 / 12.0
    }
}
