use crate::query::Granularity;
use chrono::{NaiveDateTime, Timelike};

/// Floor a timestamp to the start of its window.
///
/// `ThirtyMinutes` floors to the most recent `:00` or `:30` boundary within
/// the same hour; `OneDay` floors to midnight of the same calendar day. A
/// timestamp exactly on a boundary belongs to the window it starts.
pub fn window_start(ts: NaiveDateTime, granularity: Granularity) -> NaiveDateTime {
    match granularity {
        Granularity::ThirtyMinutes => {
            let minute = (ts.minute() / 30) * 30;
            ts.date().and_hms_opt(ts.hour(), minute, 0).unwrap()
        }
        Granularity::OneDay => ts.date().and_hms_opt(0, 0, 0).unwrap(),
    }
}
