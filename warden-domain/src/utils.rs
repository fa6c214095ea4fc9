use time::OffsetDateTime;

pub fn now_secs() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

pub fn secs_to_utc(secs: f64) -> OffsetDateTime {
    let nanos = (secs * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn utc_to_secs(when: OffsetDateTime) -> f64 {
    when.unix_timestamp_nanos() as f64 / 1_000_000_000.0
}
