//! Service calendar derivation from the raw feed.

use hashbrown::HashMap;
use log::info;

use crate::Error;
use crate::loading::gtfs::FeedContext;
use crate::model::{ExceptionKind, ServiceContext, ServiceException, ServicePeriod};

/// Derive weekly service periods, calendar-date exceptions and the feed
/// validity window.
///
/// # Errors
///
/// [`Error::DataIntegrity`] for duplicate services, missing dates or
/// unknown exception types.
pub(crate) fn compute_service_context(feed: &FeedContext) -> Result<ServiceContext, Error> {
    let mut periods = HashMap::with_capacity(feed.calendar.len());
    for row in &feed.calendar {
        let (Some(start), Some(end)) = (row.start_date, row.end_date) else {
            return Err(Error::DataIntegrity(format!(
                "calendar entry for service `{}` is missing start or end date",
                row.service_id
            )));
        };
        if start > end {
            return Err(Error::DataIntegrity(format!(
                "calendar entry for service `{}` ends before it starts",
                row.service_id
            )));
        }

        let weekdays = [
            row.monday,
            row.tuesday,
            row.wednesday,
            row.thursday,
            row.friday,
            row.saturday,
            row.sunday,
        ]
        .map(|day| day == 1);
        let previous = periods.insert(
            row.service_id.clone(),
            ServicePeriod {
                weekdays,
                start,
                end,
            },
        );
        if previous.is_some() {
            return Err(Error::DataIntegrity(format!(
                "duplicate calendar entry for service `{}`",
                row.service_id
            )));
        }
    }

    let mut exceptions: HashMap<String, Vec<ServiceException>> = HashMap::new();
    for row in &feed.calendar_dates {
        let Some(date) = row.date else {
            return Err(Error::DataIntegrity(format!(
                "calendar date for service `{}` is missing its date",
                row.service_id
            )));
        };
        let kind = match row.exception_type {
            1 => ExceptionKind::Added,
            2 => ExceptionKind::Removed,
            other => {
                return Err(Error::DataIntegrity(format!(
                    "unknown exception type {other} for service `{}`",
                    row.service_id
                )));
            }
        };
        exceptions
            .entry(row.service_id.clone())
            .or_default()
            .push(ServiceException { date, kind });
    }

    let context = ServiceContext::new(periods, exceptions);
    info!(
        "Service calendar: {} services, {} exceptions, validity {:?}",
        context.service_ids().count(),
        context.exception_count(),
        context.validity()
    );
    Ok(context)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::compute_service_context;
    use crate::Error;
    use crate::loading::gtfs::{FeedCalendar, FeedCalendarDate, FeedContext};

    fn calendar_row(service_id: &str) -> FeedCalendar {
        FeedCalendar {
            service_id: service_id.to_string(),
            monday: 1,
            tuesday: 1,
            wednesday: 1,
            thursday: 1,
            friday: 1,
            saturday: 0,
            sunday: 0,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
        }
    }

    #[test]
    fn derives_periods_and_exceptions() {
        let feed = FeedContext {
            calendar: vec![calendar_row("S1")],
            calendar_dates: vec![FeedCalendarDate {
                service_id: "S1".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 7, 4),
                exception_type: 2,
            }],
            ..FeedContext::default()
        };

        let context = compute_service_context(&feed).unwrap();
        assert!(context.period("S1").is_some());
        assert_eq!(context.exception_count(), 1);
        // Removed exception: the Friday is off despite the weekday mask.
        assert!(!context.runs_on("S1", NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()));
        assert!(context.runs_on("S1", NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()));
    }

    #[test]
    fn rejects_unknown_exception_type() {
        let feed = FeedContext {
            calendar: vec![calendar_row("S1")],
            calendar_dates: vec![FeedCalendarDate {
                service_id: "S1".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 7, 4),
                exception_type: 9,
            }],
            ..FeedContext::default()
        };
        assert!(matches!(
            compute_service_context(&feed),
            Err(Error::DataIntegrity(_))
        ));
    }

    #[test]
    fn rejects_duplicate_calendar_entries() {
        let feed = FeedContext {
            calendar: vec![calendar_row("S1"), calendar_row("S1")],
            ..FeedContext::default()
        };
        assert!(matches!(
            compute_service_context(&feed),
            Err(Error::DataIntegrity(_))
        ));
    }
}
