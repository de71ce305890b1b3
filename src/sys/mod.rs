#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as imp;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as imp;

#[cfg(not(any(unix, windows)))]
mod fallback;
#[cfg(not(any(unix, windows)))]
use fallback as imp;

/// Wall-clock and monotonic readings taken together on first use.
#[cfg(any(unix, windows))]
static ANCHOR: std::sync::OnceLock<(u64, u64)> = std::sync::OnceLock::new();

/// Returns the current wall-clock time in nanoseconds since the unix epoch.
///
/// The realtime clock is read once to anchor the process; afterwards the
/// anchor is advanced by monotonic deltas so that repeated reads within the
/// process cannot move backwards. Phase adjustments applied to the realtime
/// clock after the anchor is taken are not observed until restart.
#[cfg(any(unix, windows))]
pub fn unix_nanos() -> u64 {
    let (wall, mono) = *ANCHOR.get_or_init(|| (imp::realtime::now_ns(), imp::monotonic::now_ns()));
    wall.wrapping_add(imp::monotonic::now_ns().wrapping_sub(mono))
}

/// Returns the current wall-clock time in nanoseconds since the unix epoch.
///
/// Targets without a monotonic clock reading fall back to the system wall
/// clock, accepting whatever sub-millisecond resolution it provides.
#[cfg(not(any(unix, windows)))]
pub fn unix_nanos() -> u64 {
    imp::realtime::now_ns()
}
