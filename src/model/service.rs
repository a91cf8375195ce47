//! Derived service calendar data attached to the graph as metadata.

use chrono::{Datelike, NaiveDate};
use hashbrown::HashMap;

/// Weekly activation period of one service.
#[derive(Debug, Clone)]
pub struct ServicePeriod {
    /// Monday-first weekday mask
    pub weekdays: [bool; 7],
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Added,
    Removed,
}

/// Calendar-date exception overriding the weekly period.
#[derive(Debug, Clone, Copy)]
pub struct ServiceException {
    pub date: NaiveDate,
    pub kind: ExceptionKind,
}

/// Which services run on which dates, plus the overall feed validity window.
#[derive(Debug, Clone, Default)]
pub struct ServiceContext {
    periods: HashMap<String, ServicePeriod>,
    exceptions: HashMap<String, Vec<ServiceException>>,
    validity: Option<(NaiveDate, NaiveDate)>,
}

impl ServiceContext {
    pub fn new(
        periods: HashMap<String, ServicePeriod>,
        exceptions: HashMap<String, Vec<ServiceException>>,
    ) -> Self {
        let validity = compute_validity(&periods, &exceptions);
        Self {
            periods,
            exceptions,
            validity,
        }
    }

    /// Whether `service_id` operates on `date`. Calendar-date exceptions
    /// override the weekly period in both directions.
    pub fn runs_on(&self, service_id: &str, date: NaiveDate) -> bool {
        if let Some(exceptions) = self.exceptions.get(service_id) {
            if let Some(exception) = exceptions.iter().find(|e| e.date == date) {
                return exception.kind == ExceptionKind::Added;
            }
        }
        self.periods.get(service_id).is_some_and(|period| {
            date >= period.start
                && date <= period.end
                && period.weekdays[date.weekday().num_days_from_monday() as usize]
        })
    }

    /// Inclusive date range over which at least one service may operate.
    pub fn validity(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.validity
    }

    pub fn period(&self, service_id: &str) -> Option<&ServicePeriod> {
        self.periods.get(service_id)
    }

    pub fn service_ids(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.values().map(Vec::len).sum()
    }
}

fn compute_validity(
    periods: &HashMap<String, ServicePeriod>,
    exceptions: &HashMap<String, Vec<ServiceException>>,
) -> Option<(NaiveDate, NaiveDate)> {
    let period_dates = periods.values().map(|p| (p.start, p.end));
    // Added exceptions can extend the window; removed ones never shrink it.
    let added_dates = exceptions
        .values()
        .flatten()
        .filter(|e| e.kind == ExceptionKind::Added)
        .map(|e| (e.date, e.date));

    period_dates
        .chain(added_dates)
        .reduce(|(min_start, max_end), (start, end)| (min_start.min(start), max_end.max(end)))
}
