//! Millisecond-resolution calendar dates.
//!
//! A [`CalendarDate`] is a signed count of milliseconds since the unix epoch
//! together with an invalid sentinel state. Field accessors and mutators
//! operate in UTC and carry out-of-range values into the next larger unit, so
//! that day 32 of January becomes February 1 and month 12 becomes January of
//! the following year. Months are zero-indexed and years 0 through 99 map to
//! 1900 through 1999 during field construction.
//!
//! Any operation that cannot produce a representable instant leaves the date
//! in the invalid state rather than panicking. Reads on an invalid date
//! return `None`, serialization returns an error, and field mutators are
//! no-ops; only the absolute mutators can make the date valid again.

use core::fmt;

use time::format_description::well_known::Iso8601;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

const MILLIS_PER_SEC: i64 = 1_000;
const MILLIS_PER_MIN: i64 = 60 * MILLIS_PER_SEC;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MIN;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
const NANOS_PER_MILLI: i128 = 1_000_000;

// Julian day number of 1970-01-01.
const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

/// A millisecond-resolution calendar date, or the invalid sentinel.
///
/// The size of a `CalendarDate` is the same as an `Option<i64>`.
#[derive(Copy, Clone, Debug)]
pub struct CalendarDate {
    ms: Option<i64>,
}

impl CalendarDate {
    /// Return a `CalendarDate` for the current moment, truncated to
    /// millisecond resolution.
    pub fn now() -> Self {
        Self::from_unix_millis((crate::sys::unix_nanos() / NANOS_PER_MILLI as u64) as i64)
    }

    /// Return the invalid sentinel.
    pub fn invalid() -> Self {
        Self { ms: None }
    }

    /// Construct from a count of milliseconds since the unix epoch.
    ///
    /// Instants that fall outside the representable calendar range produce
    /// the invalid sentinel.
    pub fn from_unix_millis(ms: i64) -> Self {
        if OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * NANOS_PER_MILLI).is_ok() {
            Self { ms: Some(ms) }
        } else {
            Self::invalid()
        }
    }

    /// Construct by parsing an ISO-8601 string, producing the invalid
    /// sentinel when the string does not parse.
    pub fn from_iso_str(s: &str) -> Self {
        match Self::parse(s) {
            Some(ms) => Self::from_unix_millis(ms),
            None => Self::invalid(),
        }
    }

    /// Construct from UTC calendar fields with carry semantics.
    ///
    /// `month` is zero-indexed. Out-of-range fields roll into the adjacent
    /// larger unit: month 12 is January of `year + 1`, day 32 of January is
    /// February 1, day 0 is the last day of the previous month, and so on
    /// down through hours, minutes, seconds, and milliseconds. A `year` in
    /// 0..=99 is interpreted as 1900..=1999.
    pub fn from_fields(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
    ) -> Self {
        let year = if (0..=99).contains(&year) {
            year + 1900
        } else {
            year
        };
        Self::join_fields(year, month, day, hour, minute, second, millisecond)
    }

    /// Field construction without the two-digit-year mapping. Field mutators
    /// re-enter through this so that a stored year below 100 round-trips.
    fn join_fields(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
    ) -> Self {
        let year = match year.checked_add(month.div_euclid(12)) {
            Some(y) => y,
            None => return Self::invalid(),
        };
        let month = month.rem_euclid(12) as u8;

        let year = match i32::try_from(year) {
            Ok(y) => y,
            Err(_) => return Self::invalid(),
        };
        let month = match Month::try_from(month + 1) {
            Ok(m) => m,
            Err(_) => return Self::invalid(),
        };
        let first = match Date::from_calendar_date(year, month, 1) {
            Ok(d) => d,
            Err(_) => return Self::invalid(),
        };

        let days = first.to_julian_day() as i64 - UNIX_EPOCH_JULIAN_DAY;

        let ms = days
            .checked_mul(MILLIS_PER_DAY)
            .and_then(|ms| {
                day.checked_sub(1)
                    .and_then(|d| d.checked_mul(MILLIS_PER_DAY))
                    .and_then(|v| ms.checked_add(v))
            })
            .and_then(|ms| hour.checked_mul(MILLIS_PER_HOUR).and_then(|v| ms.checked_add(v)))
            .and_then(|ms| minute.checked_mul(MILLIS_PER_MIN).and_then(|v| ms.checked_add(v)))
            .and_then(|ms| second.checked_mul(MILLIS_PER_SEC).and_then(|v| ms.checked_add(v)))
            .and_then(|ms| ms.checked_add(millisecond));

        match ms {
            Some(ms) => Self::from_unix_millis(ms),
            None => Self::invalid(),
        }
    }

    /// Parse an ISO-8601 string to milliseconds since the unix epoch.
    ///
    /// Strings with an offset are converted to UTC; strings without an
    /// offset and date-only strings are taken as UTC. Fractional seconds
    /// beyond milliseconds are truncated. Returns `None` when the string
    /// does not parse.
    pub fn parse(s: &str) -> Option<i64> {
        if let Ok(dt) = OffsetDateTime::parse(s, &Iso8601::DEFAULT) {
            return Some(millis_of(dt));
        }
        if let Ok(dt) = PrimitiveDateTime::parse(s, &Iso8601::DEFAULT) {
            return Some(millis_of(dt.assume_utc()));
        }
        if let Ok(d) = Date::parse(s, &Iso8601::DEFAULT) {
            return Some(millis_of(PrimitiveDateTime::new(d, Time::MIDNIGHT).assume_utc()));
        }
        None
    }

    /// Returns `true` when this date holds a representable instant.
    pub fn is_valid(&self) -> bool {
        self.ms.is_some()
    }

    /// Milliseconds since the unix epoch, or `None` when invalid.
    pub fn unix_millis(&self) -> Option<i64> {
        self.ms
    }

    /// Set the instant to a count of milliseconds since the unix epoch. This
    /// can make an invalid date valid again.
    pub fn set_unix_millis(&mut self, ms: i64) {
        *self = Self::from_unix_millis(ms);
    }

    /// Force the invalid sentinel.
    pub fn invalidate(&mut self) {
        self.ms = None;
    }

    fn to_offset(&self) -> Option<OffsetDateTime> {
        self.ms
            .and_then(|ms| OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * NANOS_PER_MILLI).ok())
    }

    pub fn year(&self) -> Option<i32> {
        self.to_offset().map(|dt| dt.date().year())
    }

    /// Zero-indexed month, 0 is January.
    pub fn month(&self) -> Option<u8> {
        self.to_offset().map(|dt| dt.date().month() as u8 - 1)
    }

    /// Day of the month, 1 through 31.
    pub fn day(&self) -> Option<u8> {
        self.to_offset().map(|dt| dt.date().day())
    }

    /// Day of the week, 0 is Sunday.
    pub fn weekday(&self) -> Option<u8> {
        self.to_offset()
            .map(|dt| dt.date().weekday().number_days_from_sunday())
    }

    pub fn hour(&self) -> Option<u8> {
        self.to_offset().map(|dt| dt.time().hour())
    }

    pub fn minute(&self) -> Option<u8> {
        self.to_offset().map(|dt| dt.time().minute())
    }

    pub fn second(&self) -> Option<u8> {
        self.to_offset().map(|dt| dt.time().second())
    }

    pub fn millisecond(&self) -> Option<u16> {
        self.to_offset().map(|dt| dt.time().millisecond())
    }

    /// Current fields as `(year, month, day, hour, minute, second,
    /// millisecond)` for re-entry through field construction.
    fn fields(&self) -> Option<(i64, i64, i64, i64, i64, i64, i64)> {
        let dt = self.to_offset()?;
        let date = dt.date();
        let time = dt.time();
        Some((
            date.year() as i64,
            date.month() as i64 - 1,
            date.day() as i64,
            time.hour() as i64,
            time.minute() as i64,
            time.second() as i64,
            time.millisecond() as i64,
        ))
    }

    fn rebuild(
        &mut self,
        f: impl FnOnce(&mut (i64, i64, i64, i64, i64, i64, i64)),
    ) {
        if let Some(mut fields) = self.fields() {
            f(&mut fields);
            let (y, mo, d, h, mi, s, ms) = fields;
            *self = Self::join_fields(y, mo, d, h, mi, s, ms);
        }
    }

    pub fn set_year(&mut self, year: i64) {
        self.rebuild(|f| f.0 = year);
    }

    /// Set the zero-indexed month. Out-of-range values roll into the year.
    pub fn set_month(&mut self, month: i64) {
        self.rebuild(|f| f.1 = month);
    }

    /// Set the day of the month. Out-of-range values roll into the month.
    pub fn set_day(&mut self, day: i64) {
        self.rebuild(|f| f.2 = day);
    }

    pub fn set_hour(&mut self, hour: i64) {
        self.rebuild(|f| f.3 = hour);
    }

    pub fn set_minute(&mut self, minute: i64) {
        self.rebuild(|f| f.4 = minute);
    }

    pub fn set_second(&mut self, second: i64) {
        self.rebuild(|f| f.5 = second);
    }

    /// Set the millisecond field. Values outside 0..=999 roll into seconds
    /// and beyond.
    pub fn set_millisecond(&mut self, millisecond: i64) {
        self.rebuild(|f| f.6 = millisecond);
    }

    /// Format as `YYYY-MM-DDTHH:mm:ss.sssZ`. Years outside 0..=9999 use the
    /// expanded six-digit signed form.
    pub fn to_iso_string(&self) -> Result<String, InvalidDateError> {
        let dt = self.to_offset().ok_or(InvalidDateError)?;
        let date = dt.date();
        let time = dt.time();

        let year = date.year();
        let year = if (0..=9999).contains(&year) {
            format!("{year:04}")
        } else {
            format!("{year:+07}")
        };

        Ok(format!(
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            year,
            date.month() as u8,
            date.day(),
            time.hour(),
            time.minute(),
            time.second(),
            time.millisecond(),
        ))
    }
}

// Invalid dates compare like NaN: not equal to anything, including
// themselves, and unordered.
impl PartialEq for CalendarDate {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.ms, other.ms), (Some(a), Some(b)) if a == b)
    }
}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        match (self.ms, other.ms) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("Invalid Date"),
        }
    }
}

/// The error returned when an operation requires a valid instant but the
/// date holds the invalid sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidDateError;

impl InvalidDateError {
    const fn description(&self) -> &'static str {
        "the date does not represent a valid instant"
    }
}

impl fmt::Display for InvalidDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.description().fmt(f)
    }
}

impl std::error::Error for InvalidDateError {}

fn millis_of(dt: OffsetDateTime) -> i64 {
    dt.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI) as i64
}
