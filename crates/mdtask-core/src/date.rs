use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, Month};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` literal. Out-of-range components yield `None`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    Date::parse(raw, ISO_DATE).ok()
}

/// Render a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Signed number of whole days from `from` to `to`.
#[must_use]
pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}

/// Shift a date by a signed number of days.
#[must_use]
pub fn add_days(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Duration::days(days))
}

/// A year/month/day triple that may not exist on the calendar yet
/// (day 31 of a 30-day month, February 29 of a common year).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
    /// Day of month, possibly past the end of the month.
    pub day: u8,
}

impl CalendarDay {
    /// Triple for an existing date.
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    /// Move `months` calendar months forward, keeping the day-of-month as is.
    #[must_use]
    pub fn plus_months(self, months: i64) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(u8::from(self.month)) - 1 + months;
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        Some(Self {
            year,
            month: Month::try_from(month).ok()?,
            day: self.day,
        })
    }

    /// Resolve to a real date, moving an invalid day backward to the last day
    /// of the month. Never moves forward into the next month.
    #[must_use]
    pub fn clamp(self) -> Option<Date> {
        let day = self.day.clamp(1, self.month.length(self.year));
        Date::from_calendar_date(self.year, self.month, day).ok()
    }
}

/// Serde adapter rendering `Option<Date>` as `"YYYY-MM-DD"` or `null`.
pub mod serde_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    /// Serialize an optional date as a `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<Date>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => s.serialize_str(&super::format_date(*date)),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Fails when the string is not a valid calendar date.
    pub fn deserialize<'de, D>(d: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        raw.map(|value| {
            super::parse_date(&value)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {value}")))
        })
        .transpose()
    }
}
