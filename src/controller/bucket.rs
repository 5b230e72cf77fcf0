//! Recency buckets for grouping records by creation time.
//!
//! Weeks are ISO weeks (Monday first) in the time zone of the reference
//! instant. Rules are evaluated in order and the first match wins:
//! today, yesterday, this week, last calendar month, older.

use std::fmt;

use jiff::Timestamp;
use jiff::Zoned;
use jiff::civil::Date;

use crate::types::Entity;

/// One recency class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Today,
    Yesterday,
    ThisWeek,
    LastMonth,
    Older,
}

impl Bucket {
    /// Display order
    pub const ALL: [Bucket; 5] = [
        Bucket::Today,
        Bucket::Yesterday,
        Bucket::ThisWeek,
        Bucket::LastMonth,
        Bucket::Older,
    ];

    /// Wire key used by the categorised reports listing
    pub fn key(self) -> &'static str {
        match self {
            Bucket::Today => "today",
            Bucket::Yesterday => "yesterday",
            Bucket::ThisWeek => "thisWeek",
            Bucket::LastMonth => "lastMonth",
            Bucket::Older => "older",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Yesterday => "Yesterday",
            Bucket::ThisWeek => "This week",
            Bucket::LastMonth => "Last month",
            Bucket::Older => "Older",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Classify a creation instant relative to `now`.
    ///
    /// Records without a creation instant are `Older`.
    pub fn classify(created: Option<Timestamp>, now: &Zoned) -> Bucket {
        let Some(created) = created else {
            return Bucket::Older;
        };
        let day = created.to_zoned(now.time_zone().clone()).date();
        let today = now.date();

        if day == today {
            Bucket::Today
        } else if today.yesterday().ok() == Some(day) {
            Bucket::Yesterday
        } else if same_iso_week(day, today) {
            Bucket::ThisWeek
        } else if in_previous_month(day, today) {
            Bucket::LastMonth
        } else {
            Bucket::Older
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

fn same_iso_week(a: Date, b: Date) -> bool {
    let (a, b) = (a.iso_week_date(), b.iso_week_date());
    a.year() == b.year() && a.week() == b.week()
}

fn in_previous_month(day: Date, today: Date) -> bool {
    match today.first_of_month().yesterday() {
        Ok(prev) => day.year() == prev.year() && day.month() == prev.month(),
        Err(_) => false,
    }
}

/// A page of records partitioned into recency buckets.
///
/// Membership is fixed when the collection is built; it is not re-evaluated
/// as time passes.
#[derive(Debug, Clone)]
pub struct BucketedCollection<T> {
    buckets: [Vec<T>; 5],
    now: Zoned,
}

impl<T> BucketedCollection<T> {
    pub fn get(&self, bucket: Bucket) -> &[T] {
        &self.buckets[bucket.index()]
    }

    /// Buckets in display order, empty ones included
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[T])> {
        Bucket::ALL
            .into_iter()
            .map(move |b| (b, self.buckets[b.index()].as_slice()))
    }

    /// Reference instant the buckets were computed against
    pub fn now(&self) -> &Zoned {
        &self.now
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

/// Partition records into recency buckets, keeping their relative order
pub fn bucket<T: Entity>(items: impl IntoIterator<Item = T>, now: &Zoned) -> BucketedCollection<T> {
    let mut buckets: [Vec<T>; 5] = Default::default();
    for item in items {
        let b = Bucket::classify(item.created_at(), now);
        buckets[b.index()].push(item);
    }
    BucketedCollection {
        buckets,
        now: now.clone(),
    }
}
