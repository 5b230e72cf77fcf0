//! Report filter composition.
//!
//! A report set is narrowed in three steps: the server-side creation date
//! range, an optional flag filter, and an optional fuzzy row filter over the
//! records already on screen.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use jiff::civil::Date;

use crate::error::{DeskError, Result};
use crate::types::{Entity, Report};

/// Flag values offered by the report filter
pub const FLAG_OPTIONS: &[&str] = &["panama", "honduras", "belize"];

/// Inclusive range of creation dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self> {
        if start > end {
            return Err(DeskError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both endpoints from `YYYY-MM-DD` text.
    ///
    /// Both endpoints are required; nothing is fetched until they are present.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = required_date("start", start)?;
        let end = required_date("end", end)?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Heading shown above a filtered report set
    pub fn heading(&self) -> String {
        format!(
            "Report from {} to {}",
            self.start.strftime("%-d %B %Y"),
            self.end.strftime("%-d %B %Y")
        )
    }
}

fn required_date(which: &str, raw: Option<&str>) -> Result<Date> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        DeskError::Validation(format!(
            "both a start and an end date are required ({which} date is missing)"
        ))
    })?;
    raw.parse().map_err(|_| {
        DeskError::Validation(format!(
            "invalid {which} date '{raw}', expected YYYY-MM-DD"
        ))
    })
}

/// Keep reports whose ship flag contains `flag`, ignoring case.
///
/// An empty flag keeps everything.
pub fn filter_by_flag(reports: Vec<Report>, flag: &str) -> Vec<Report> {
    let needle = flag.trim().to_lowercase();
    if needle.is_empty() {
        return reports;
    }
    reports
        .into_iter()
        .filter(|r| {
            r.ship_flag()
                .is_some_and(|f| f.to_lowercase().contains(&needle))
        })
        .collect()
}

/// A record with its fuzzy match score
#[derive(Debug, Clone)]
pub struct Scored<T> {
    pub item: T,
    pub score: i64,
}

/// Filter records by a fuzzy query, best matches first
pub fn fuzzy_filter<T: Entity>(items: &[T], query: &str) -> Vec<Scored<T>> {
    if query.is_empty() {
        return items
            .iter()
            .map(|item| Scored {
                item: item.clone(),
                score: 0,
            })
            .collect();
    }

    let matcher = SkimMatcherV2::default().smart_case();

    let mut matched: Vec<Scored<T>> = items
        .iter()
        .filter_map(|item| {
            matcher
                .fuzzy_match(&item.search_text(), query)
                .map(|score| Scored {
                    item: item.clone(),
                    score,
                })
        })
        .collect();
    // Stable, so equal scores keep page order
    matched.sort_by(|a, b| b.score.cmp(&a.score));
    matched
}
