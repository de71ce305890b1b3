//! Nanosecond-precision calendar dates.
//!
//! A [`PreciseDate`] composes a millisecond [`CalendarDate`] with microsecond
//! and nanosecond remainders, each bounded to 0..=999. The calendar surface
//! of the millisecond type is forwarded unchanged; the precise type adds the
//! sub-millisecond mutators, whose out-of-range values carry into the
//! millisecond field, and exact `i128` epoch-nanosecond reads.

use core::fmt;

use crate::calendar::{CalendarDate, InvalidDateError};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// A calendar date with nanosecond resolution.
///
/// The millisecond portion behaves exactly like a [`CalendarDate`],
/// including the invalid sentinel. Whenever the instant is valid, the
/// microsecond and nanosecond remainders are in 0..=999; when it is invalid
/// they are meaningless and every derived read reports the invalidity.
#[derive(Copy, Clone, Debug)]
pub struct PreciseDate {
    date: CalendarDate,
    micros: u16,
    nanos: u16,
}

impl PreciseDate {
    /// Return a `PreciseDate` for the current moment with full nanosecond
    /// resolution.
    pub fn now() -> Self {
        Self::from_unix_nanos(Self::now_nanos())
    }

    /// Nanoseconds since the unix epoch for the current moment.
    ///
    /// Reads the process-wide clock anchor: a wall-clock reading taken on
    /// first use, advanced by monotonic deltas afterwards.
    pub fn now_nanos() -> i128 {
        crate::sys::unix_nanos() as i128
    }

    /// Return the invalid sentinel.
    pub fn invalid() -> Self {
        Self {
            date: CalendarDate::invalid(),
            micros: 0,
            nanos: 0,
        }
    }

    /// Construct from a count of nanoseconds since the unix epoch.
    ///
    /// The value is decomposed with euclidean division so that the
    /// remainders are always in 0..=999 and recomposition through
    /// [`unix_nanos`](Self::unix_nanos) returns the input exactly, for
    /// positive and negative instants alike.
    pub fn from_unix_nanos(ns: i128) -> Self {
        let ms = ns.div_euclid(NANOS_PER_MILLI);
        let ms = match i64::try_from(ms) {
            Ok(ms) => ms,
            Err(_) => return Self::invalid(),
        };

        let date = CalendarDate::from_unix_millis(ms);
        if !date.is_valid() {
            return Self::invalid();
        }

        Self {
            date,
            micros: ns.div_euclid(1_000).rem_euclid(1_000) as u16,
            nanos: ns.rem_euclid(1_000) as u16,
        }
    }

    /// Construct from a count of milliseconds since the unix epoch; the
    /// sub-millisecond remainders are zero.
    pub fn from_unix_millis(ms: i64) -> Self {
        Self {
            date: CalendarDate::from_unix_millis(ms),
            micros: 0,
            nanos: 0,
        }
    }

    /// Construct from UTC calendar fields with the carry semantics of
    /// [`CalendarDate::from_fields`]; the sub-millisecond remainders are
    /// zero.
    pub fn from_fields(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
    ) -> Self {
        Self {
            date: CalendarDate::from_fields(year, month, day, hour, minute, second, millisecond),
            micros: 0,
            nanos: 0,
        }
    }

    /// Construct from UTC calendar fields extended with microsecond and
    /// nanosecond values.
    ///
    /// The two extra values are applied through the sub-millisecond mutators,
    /// so values of 1000 or more carry into the larger fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_precise_fields(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
        microsecond: i64,
        nanosecond: i64,
    ) -> Self {
        let mut date = Self::from_fields(year, month, day, hour, minute, second, millisecond);
        date.set_microseconds(microsecond as f64);
        date.set_nanoseconds(nanosecond as f64);
        date
    }

    /// The microsecond remainder, 0..=999 whenever the instant is valid.
    pub fn microseconds(&self) -> u16 {
        self.micros
    }

    /// Set the microsecond remainder.
    ///
    /// A non-finite value invalidates the entire instant. Values outside
    /// 0..=999 carry `floor(value / 1000)` milliseconds into the calendar
    /// portion, rolling further up as needed, and store the euclidean
    /// remainder.
    pub fn set_microseconds(&mut self, value: f64) {
        if !value.is_finite() {
            self.date.invalidate();
            return;
        }

        let value = value.floor() as i64;
        let extra_millis = value.div_euclid(1_000);
        if extra_millis != 0 {
            if let Some(ms) = self.date.millisecond() {
                self.date.set_millisecond(ms as i64 + extra_millis);
            }
        }
        self.micros = value.rem_euclid(1_000) as u16;
    }

    /// The nanosecond remainder, 0..=999 whenever the instant is valid.
    pub fn nanoseconds(&self) -> u16 {
        self.nanos
    }

    /// Set the nanosecond remainder.
    ///
    /// Behaves like [`set_microseconds`](Self::set_microseconds) one level
    /// down: the carry goes into the microsecond field, which may itself
    /// carry into milliseconds.
    pub fn set_nanoseconds(&mut self, value: f64) {
        if !value.is_finite() {
            self.date.invalidate();
            return;
        }

        let value = value.floor() as i64;
        let extra_micros = value.div_euclid(1_000);
        if extra_micros != 0 {
            self.set_microseconds(self.micros as f64 + extra_micros as f64);
        }
        self.nanos = value.rem_euclid(1_000) as u16;
    }

    /// Set the instant to a count of nanoseconds since the unix epoch,
    /// decomposed as in [`from_unix_nanos`](Self::from_unix_nanos).
    pub fn set_unix_nanos(&mut self, ns: i128) {
        *self = Self::from_unix_nanos(ns);
    }

    /// Set the instant to a count of milliseconds since the unix epoch; the
    /// sub-millisecond remainders are reset to zero.
    pub fn set_unix_millis(&mut self, ms: i64) {
        *self = Self::from_unix_millis(ms);
    }

    /// Force the invalid sentinel.
    pub fn invalidate(&mut self) {
        self.date.invalidate();
        self.micros = 0;
        self.nanos = 0;
    }

    /// Nanoseconds since the unix epoch, or `None` when invalid.
    ///
    /// Computed in `i128` so no precision is lost at large epoch magnitudes.
    pub fn unix_nanos(&self) -> Option<i128> {
        self.date.unix_millis().map(|ms| {
            ms as i128 * NANOS_PER_MILLI + self.micros as i128 * 1_000 + self.nanos as i128
        })
    }

    /// Milliseconds since the unix epoch, or `None` when invalid.
    ///
    /// This is the numeric-coercion view of the date: for every valid
    /// instant it equals [`unix_nanos`](Self::unix_nanos) divided by one
    /// million.
    pub fn unix_millis(&self) -> Option<i64> {
        self.date.unix_millis()
    }

    /// The millisecond calendar portion of this date.
    pub fn calendar(&self) -> CalendarDate {
        self.date
    }

    /// Format as `YYYY-MM-DDTHH:mm:ss.sssssssssZ` with exactly nine
    /// fractional digits, or return an error when the instant is invalid.
    pub fn to_iso_string(&self) -> Result<String, InvalidDateError> {
        let base = self.date.to_iso_string()?;
        // the millisecond form always ends in "Z"
        let prefix = &base[..base.len() - 1];
        Ok(format!("{}{:03}{:03}Z", prefix, self.micros, self.nanos))
    }

    /// Parse an ISO-8601 string to milliseconds since the unix epoch. This
    /// is the millisecond facility's parser unchanged; it never reports
    /// sub-millisecond precision.
    pub fn parse(s: &str) -> Option<i64> {
        CalendarDate::parse(s)
    }

    /// Milliseconds since the unix epoch for the given UTC calendar fields,
    /// with carry semantics, or `None` when the fields do not produce a
    /// representable instant.
    pub fn utc(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
    ) -> Option<i64> {
        CalendarDate::from_fields(year, month, day, hour, minute, second, millisecond).unix_millis()
    }

    // Calendar accessors and mutators forwarded to the millisecond portion.
    // Mutating through these leaves the sub-millisecond remainders alone.

    pub fn is_valid(&self) -> bool {
        self.date.is_valid()
    }

    pub fn year(&self) -> Option<i32> {
        self.date.year()
    }

    /// Zero-indexed month, 0 is January.
    pub fn month(&self) -> Option<u8> {
        self.date.month()
    }

    pub fn day(&self) -> Option<u8> {
        self.date.day()
    }

    /// Day of the week, 0 is Sunday.
    pub fn weekday(&self) -> Option<u8> {
        self.date.weekday()
    }

    pub fn hour(&self) -> Option<u8> {
        self.date.hour()
    }

    pub fn minute(&self) -> Option<u8> {
        self.date.minute()
    }

    pub fn second(&self) -> Option<u8> {
        self.date.second()
    }

    pub fn millisecond(&self) -> Option<u16> {
        self.date.millisecond()
    }

    pub fn set_year(&mut self, year: i64) {
        self.date.set_year(year);
    }

    pub fn set_month(&mut self, month: i64) {
        self.date.set_month(month);
    }

    pub fn set_day(&mut self, day: i64) {
        self.date.set_day(day);
    }

    pub fn set_hour(&mut self, hour: i64) {
        self.date.set_hour(hour);
    }

    pub fn set_minute(&mut self, minute: i64) {
        self.date.set_minute(minute);
    }

    pub fn set_second(&mut self, second: i64) {
        self.date.set_second(second);
    }

    pub fn set_millisecond(&mut self, millisecond: i64) {
        self.date.set_millisecond(millisecond);
    }
}

impl From<&str> for PreciseDate {
    /// Parse a string, producing the invalid sentinel on failure.
    ///
    /// When the string parses and ends in a fractional-seconds suffix of
    /// three to nine digits followed by `Z`, the digits are padded on the
    /// right to nine and digits 4-6 become the microsecond remainder,
    /// digits 7-9 the nanosecond remainder. Any other form, including
    /// offset suffixes and one or two fractional digits, leaves the
    /// remainders at zero.
    fn from(s: &str) -> Self {
        let date = CalendarDate::from_iso_str(s);
        let (micros, nanos) = if date.is_valid() {
            fraction_suffix(s).unwrap_or((0, 0))
        } else {
            (0, 0)
        };
        Self {
            date,
            micros,
            nanos,
        }
    }
}

impl From<CalendarDate> for PreciseDate {
    fn from(date: CalendarDate) -> Self {
        Self {
            date,
            micros: 0,
            nanos: 0,
        }
    }
}

impl From<i64> for PreciseDate {
    /// Milliseconds since the unix epoch.
    fn from(ms: i64) -> Self {
        Self::from_unix_millis(ms)
    }
}

impl From<i128> for PreciseDate {
    /// Nanoseconds since the unix epoch.
    fn from(ns: i128) -> Self {
        Self::from_unix_nanos(ns)
    }
}

// Comparison uses the exact nanosecond value; invalid dates compare like
// NaN: not equal to anything, including themselves, and unordered.
impl PartialEq for PreciseDate {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self.unix_nanos(), other.unix_nanos()),
            (Some(a), Some(b)) if a == b
        )
    }
}

impl PartialOrd for PreciseDate {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        match (self.unix_nanos(), other.unix_nanos()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl fmt::Display for PreciseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("Invalid Date"),
        }
    }
}

/// Extract `(microseconds, nanoseconds)` from a trailing `.<3-9 digits>Z`,
/// padding the digits on the right to nine.
fn fraction_suffix(s: &str) -> Option<(u16, u16)> {
    let rest = s.strip_suffix('Z')?;
    let dot = rest.rfind('.')?;
    let digits = rest[dot + 1..].as_bytes();

    if !(3..=9).contains(&digits.len()) || !digits.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut padded = [b'0'; 9];
    padded[..digits.len()].copy_from_slice(digits);

    let group = |i: usize| -> u16 {
        padded[i..i + 3]
            .iter()
            .fold(0, |acc, b| acc * 10 + (b - b'0') as u16)
    };

    Some((group(3), group(6)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_round_trip_nine_digits() {
        let s = "2023-01-01T12:00:00.123456789Z";
        let d = PreciseDate::from(s);
        assert_eq!(d.microseconds(), 456);
        assert_eq!(d.nanoseconds(), 789);
        assert_eq!(d.to_iso_string().unwrap(), s);

        let again = PreciseDate::from(d.to_iso_string().unwrap().as_str());
        assert_eq!(again.unix_nanos(), d.unix_nanos());
    }

    #[test]
    fn short_fraction_pads_right() {
        let d = PreciseDate::from("2023-01-01T00:00:00.1234Z");
        assert_eq!(d.millisecond(), Some(123));
        assert_eq!(d.microseconds(), 400);
        assert_eq!(d.nanoseconds(), 0);
    }

    #[test]
    fn three_digit_fraction_has_zero_remainders() {
        let d = PreciseDate::from("2023-01-01T00:00:00.123Z");
        assert_eq!(d.millisecond(), Some(123));
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.nanoseconds(), 0);
    }

    #[test]
    fn offset_suffix_has_zero_remainders() {
        let d = PreciseDate::from("2023-01-01T12:00:00.123456789+00:00");
        assert!(d.is_valid());
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.nanoseconds(), 0);
    }

    #[test]
    fn date_only_string() {
        let d = PreciseDate::from("2023-01-01");
        assert_eq!(d.unix_millis(), Some(1_672_531_200_000));
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.nanoseconds(), 0);
    }

    #[test]
    fn invalid_string_poisons() {
        let d = PreciseDate::from("invalid-date");
        assert!(!d.is_valid());
        assert_eq!(d.unix_nanos(), None);
        assert_eq!(d.to_iso_string(), Err(InvalidDateError));
        assert_eq!(format!("{d}"), "Invalid Date");
    }

    #[test]
    fn precise_fields_scenario() {
        let d = PreciseDate::from_precise_fields(2023, 0, 1, 12, 0, 0, 0, 123, 456);
        assert_eq!(d.microseconds(), 123);
        assert_eq!(d.nanoseconds(), 456);
        assert_eq!(d.to_iso_string().unwrap(), "2023-01-01T12:00:00.000123456Z");
    }

    #[test]
    fn fields_day_overflow() {
        let d = PreciseDate::from_fields(2023, 0, 32, 0, 0, 0, 0);
        assert_eq!(d.month(), Some(1));
        assert_eq!(d.day(), Some(1));
    }

    #[test]
    fn precise_fields_carry_through_setters() {
        let d = PreciseDate::from_precise_fields(2023, 0, 1, 0, 0, 0, 0, 1_500, 2_500);
        assert_eq!(d.millisecond(), Some(1));
        assert_eq!(d.microseconds(), 502);
        assert_eq!(d.nanoseconds(), 500);
    }

    #[test]
    fn micros_roll_into_millis() {
        let mut d = PreciseDate::from_fields(2023, 0, 1, 12, 0, 0, 0);
        d.set_microseconds(1_000.0);
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.millisecond(), Some(1));
    }

    #[test]
    fn nanos_roll_through_micros_into_millis() {
        let mut d = PreciseDate::from_precise_fields(2023, 0, 1, 12, 0, 0, 0, 999, 0);
        d.set_nanoseconds(1_000.0);
        assert_eq!(d.nanoseconds(), 0);
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.millisecond(), Some(1));
    }

    #[test]
    fn millis_carry_past_second_boundary() {
        let mut d = PreciseDate::from_fields(2023, 0, 1, 23, 59, 59, 999);
        d.set_microseconds(1_000.0);
        assert_eq!(d.to_iso_string().unwrap(), "2023-01-02T00:00:00.000000000Z");
    }

    #[test]
    fn negative_micros_normalize() {
        let mut d = PreciseDate::from_fields(2023, 0, 1, 0, 0, 0, 5);
        d.set_microseconds(-1_500.0);
        assert_eq!(d.microseconds(), 500);
        assert_eq!(d.millisecond(), Some(3));
    }

    #[test]
    fn nan_poisons_micros() {
        let mut d = PreciseDate::now();
        d.set_microseconds(f64::NAN);
        assert!(!d.is_valid());
        assert_eq!(d.unix_nanos(), None);
    }

    #[test]
    fn nan_poisons_nanos() {
        let mut d = PreciseDate::from_fields(2023, 0, 1, 0, 0, 0, 0);
        d.set_nanoseconds(f64::NAN);
        assert!(!d.is_valid());
        assert_eq!(d.unix_nanos(), None);
    }

    #[test]
    fn infinity_poisons() {
        let mut d = PreciseDate::from_fields(2023, 0, 1, 0, 0, 0, 0);
        d.set_microseconds(f64::INFINITY);
        assert!(!d.is_valid());
    }

    #[test]
    fn nanos_round_trip_exact() {
        let ns = 1_672_574_400_123_456_789_i128;
        let d = PreciseDate::from(ns);
        assert_eq!(d.unix_nanos(), Some(ns));
        assert_eq!(d.microseconds(), 456);
        assert_eq!(d.nanoseconds(), 789);
    }

    #[test]
    fn negative_nanos_round_trip_exact() {
        // one nanosecond before the epoch
        let d = PreciseDate::from(-1_i128);
        assert_eq!(d.unix_millis(), Some(-1));
        assert_eq!(d.microseconds(), 999);
        assert_eq!(d.nanoseconds(), 999);
        assert_eq!(d.unix_nanos(), Some(-1));
    }

    #[test]
    fn millis_constructor_zeroes_remainders() {
        let d = PreciseDate::from(1_672_531_200_000_i64);
        assert_eq!(d.unix_nanos(), Some(1_672_531_200_000_000_000));
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.nanoseconds(), 0);
    }

    #[test]
    fn copy_is_deep_value_copy() {
        let a = PreciseDate::from("2023-01-01T12:00:00.123456789Z");
        let b = a;
        assert_eq!(a.unix_nanos(), b.unix_nanos());
        assert_eq!(a, b);
    }

    #[test]
    fn from_calendar_date() {
        let base = CalendarDate::from_unix_millis(1_672_531_200_123);
        let d = PreciseDate::from(base);
        assert_eq!(d.unix_millis(), Some(1_672_531_200_123));
        assert_eq!(d.microseconds(), 0);
        assert_eq!(d.nanoseconds(), 0);
    }

    #[test]
    fn set_time_variants() {
        let mut d = PreciseDate::from("2023-01-01T00:00:00.123456789Z");

        d.set_unix_millis(1_000);
        assert_eq!(d.unix_nanos(), Some(1_000_000_000));
        assert_eq!(d.microseconds(), 0);

        d.set_unix_nanos(1_672_531_200_000_000_042);
        assert_eq!(d.nanoseconds(), 42);

        d.invalidate();
        assert_eq!(d.unix_nanos(), None);

        d.set_unix_millis(0);
        assert!(d.is_valid());
        assert_eq!(d.unix_nanos(), Some(0));
    }

    #[test]
    fn coercion_consistency() {
        let d = PreciseDate::from("2023-01-01T12:00:00.123456789Z");
        let ns = d.unix_nanos().unwrap();
        assert_eq!(d.unix_millis().unwrap() as i128, ns.div_euclid(1_000_000));
    }

    #[test]
    fn ordering_uses_precise_value() {
        let a = PreciseDate::from("2023-01-01T12:00:00.000000001Z");
        let b = PreciseDate::from("2023-01-01T12:00:00.000000002Z");
        assert!(a < b);
        assert!(b > a);
        assert!(a != b);

        let invalid = PreciseDate::invalid();
        assert!(invalid != invalid);
        assert!(invalid.partial_cmp(&a).is_none());
    }

    #[test]
    fn calendar_mutators_keep_remainders() {
        let mut d = PreciseDate::from("2023-01-01T12:00:00.123456789Z");
        d.set_year(2024);
        d.set_day(15);
        assert_eq!(d.microseconds(), 456);
        assert_eq!(d.nanoseconds(), 789);
        assert_eq!(d.to_iso_string().unwrap(), "2024-01-15T12:00:00.123456789Z");
    }

    #[test]
    fn statics_pass_through() {
        assert_eq!(PreciseDate::parse("2023-01-01"), Some(1_672_531_200_000));
        assert_eq!(PreciseDate::parse("not-a-date"), None);
        assert_eq!(
            PreciseDate::utc(2023, 0, 1, 0, 0, 0, 0),
            Some(1_672_531_200_000)
        );
        assert_eq!(PreciseDate::utc(1_000_000, 0, 1, 0, 0, 0, 0), None);
    }

    #[test]
    fn now_is_valid_and_recent() {
        let d = PreciseDate::now();
        assert!(d.is_valid());
        // after 2021-01-01, before 2100-01-01
        let ns = d.unix_nanos().unwrap();
        assert!(ns > 1_609_459_200_000_000_000);
        assert!(ns < 4_102_444_800_000_000_000);
    }

    #[test]
    fn now_matches_static_now() {
        let ns = PreciseDate::now_nanos();
        let d = PreciseDate::from(ns);
        assert_eq!(d.unix_nanos(), Some(ns));
    }

    #[test]
    fn fraction_suffix_rules() {
        assert_eq!(fraction_suffix("2023-01-01T00:00:00.123Z"), Some((0, 0)));
        assert_eq!(
            fraction_suffix("2023-01-01T00:00:00.123456789Z"),
            Some((456, 789))
        );
        // too short, too long, missing Z, non-digits
        assert_eq!(fraction_suffix("2023-01-01T00:00:00.12Z"), None);
        assert_eq!(fraction_suffix("2023-01-01T00:00:00.1234567890Z"), None);
        assert_eq!(fraction_suffix("2023-01-01T00:00:00.123"), None);
        assert_eq!(fraction_suffix("2023-01-01T00:00:00.12a456789Z"), None);
    }
}
