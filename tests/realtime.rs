use precisedate::PreciseDate;
use std::time::SystemTime;

fn to_unix_ns(t: SystemTime) -> i128 {
    t.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_nanos() as i128
}

#[test]
fn now_tracks_system_clock() {
    // the realtime clock may jump backward, so we may need to try a few times
    for _ in 0..5 {
        let t0 = SystemTime::now();
        let t1 = PreciseDate::now_nanos();
        let t2 = SystemTime::now();
        let t3 = PreciseDate::now_nanos();
        let t4 = SystemTime::now();

        // check that the clock has moved forward and not backward
        if t0 < t2 && t2 < t4 {
            let ut0 = to_unix_ns(t0) / 1_000_000_000;
            let ut1 = t1 / 1_000_000_000;
            let ut2 = to_unix_ns(t2) / 1_000_000_000;
            let ut3 = t3 / 1_000_000_000;
            let ut4 = to_unix_ns(t4) / 1_000_000_000;

            assert!(ut0 <= ut1, "ut0: {ut0} ut1: {ut1}");
            assert!(ut1 <= ut2, "ut1: {ut1} ut2: {ut2}");
            assert!(ut2 <= ut3, "ut2: {ut2} ut3: {ut3}");
            assert!(ut3 <= ut4, "ut3: {ut3} ut4: {ut4}");
        }
    }
}

#[test]
fn now_nanos_is_nondecreasing() {
    let mut prev = PreciseDate::now_nanos();
    for _ in 0..1_000 {
        let next = PreciseDate::now_nanos();
        assert!(next >= prev);
        prev = next;
    }
}

#[test]
fn now_round_trips_through_iso() {
    let d = PreciseDate::now();
    let s = d.to_iso_string().unwrap();
    let parsed = PreciseDate::from(s.as_str());
    assert_eq!(parsed.unix_nanos(), d.unix_nanos());
}
