//! Assigns dated records to the buckets of a [`MonthWindow`].

use chrono::NaiveDate;
use tracing::trace;

use crate::window::{MonthBucket, MonthWindow};

/// Dense grouping of records by month bucket.
///
/// Every bucket of the window is present, in chronological order, even when
/// no record falls inside it.
#[derive(Debug)]
pub struct Buckets<'w, 'r, T> {
    window: &'w MonthWindow,
    groups: Vec<Vec<&'r T>>,
    outside: usize,
}

/// Group `records` by the bucket containing `date_of(record)`.
///
/// Records dated outside the window are counted in [`Buckets::outside`] and
/// otherwise dropped from the bucketed view.
pub fn bucketize<'w, 'r, T, I, F>(
    window: &'w MonthWindow,
    records: I,
    date_of: F,
) -> Buckets<'w, 'r, T>
where
    T: 'r,
    I: IntoIterator<Item = &'r T>,
    F: Fn(&T) -> NaiveDate,
{
    let mut groups: Vec<Vec<&'r T>> = vec![Vec::new(); window.len()];
    let mut outside = 0usize;

    for record in records {
        match window.bucket_index(date_of(record)) {
            Some(i) => groups[i].push(record),
            None => outside += 1,
        }
    }

    if outside > 0 {
        trace!(outside, buckets = window.len(), "records outside window");
    }

    Buckets {
        window,
        groups,
        outside,
    }
}

impl<'w, 'r, T> Buckets<'w, 'r, T> {
    /// `(bucket, records)` pairs, oldest bucket first.
    pub fn iter(&self) -> impl Iterator<Item = (&'w MonthBucket, &[&'r T])> + '_ {
        self.window
            .buckets()
            .iter()
            .zip(self.groups.iter().map(Vec::as_slice))
    }

    /// Records in the bucket with the given `"%Y-%m"` key (empty if unknown).
    pub fn get(&self, key: &str) -> &[&'r T] {
        self.window
            .buckets()
            .iter()
            .position(|b| b.key == key)
            .map(|i| self.groups[i].as_slice())
            .unwrap_or(&[])
    }

    /// Number of records that matched no bucket.
    pub fn outside(&self) -> usize {
        self.outside
    }

    /// Fold every bucket into a value, preserving window order.
    pub fn map<U>(&self, mut f: impl FnMut(&MonthBucket, &[&'r T]) -> U) -> Vec<U> {
        self.iter().map(|(bucket, records)| f(bucket, records)).collect()
    }
}
