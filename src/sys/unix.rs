pub fn read_clock(clock: i32) -> libc::timespec {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    unsafe {
        libc::clock_gettime(clock as _, &mut ts);
    }

    ts
}

pub mod monotonic {
    use super::*;

    pub fn now_ns() -> u64 {
        let ts = read_clock(libc::CLOCK_MONOTONIC as _);

        (ts.tv_sec as u64)
            .wrapping_mul(1_000_000_000)
            .wrapping_add(ts.tv_nsec as u64)
    }
}

pub mod realtime {
    use super::*;

    pub fn now_ns() -> u64 {
        let ts = read_clock(libc::CLOCK_REALTIME as _);

        (ts.tv_sec as u64)
            .wrapping_mul(1_000_000_000)
            .wrapping_add(ts.tv_nsec as u64)
    }
}
