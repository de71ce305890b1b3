//! This crate provides calendar date types with millisecond or nanosecond
//! resolution backed by a signed epoch-millisecond representation.
//!
//! A [`calendar::CalendarDate`] is a millisecond-resolution instant with
//! field accessors and mutators that carry out-of-range values into the next
//! larger unit, ISO-8601 parsing and formatting, and an invalid sentinel
//! state that is propagated instead of panicking.
//!
//! A [`precise::PreciseDate`] composes a `CalendarDate` with bounded
//! microsecond and nanosecond remainders, extending the instant to full
//! nanosecond resolution while keeping the calendar surface of the
//! millisecond type. Epoch arithmetic on the precise type uses `i128`
//! nanoseconds so that no precision is lost at large epoch magnitudes.

pub mod calendar;
pub mod precise;

mod sys;

pub use calendar::{CalendarDate, InvalidDateError};
pub use precise::PreciseDate;
