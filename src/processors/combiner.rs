use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{JoinKind, Monitor};

/// Combine AirNow, AIRSIS and WRCC monitors into a single monitor.
///
/// Metadata rows are concatenated in that order. Data is restricted to the
/// window where all three sources overlap, joined on `datetime`, and any
/// series left without a valid value is dropped.
pub fn combine_aaw(airnow: &Monitor, airsis: &Monitor, wrcc: &Monitor) -> Monitor {
    let combined = combine_all(&[airnow.clone(), airsis.clone(), wrcc.clone()]);

    info!(
        "Combined AirNow ({}), AIRSIS ({}) and WRCC ({}) into {} series over {} hours",
        airnow.count(),
        airsis.count(),
        wrcc.count(),
        combined.count(),
        combined.data().num_rows()
    );

    combined
}

/// Overlap-window combine of any number of monitors, followed by
/// [`Monitor::drop_empty`].
pub fn combine_all(monitors: &[Monitor]) -> Monitor {
    let Some((first, rest)) = monitors.split_first() else {
        return Monitor::empty();
    };

    let window = overlap_window(monitors);
    match window {
        Some((start, end)) => debug!("Overlap window {} to {}", start, end),
        None => debug!("Sources share no time window"),
    }

    let restrict = |monitor: &Monitor| -> Monitor {
        match window {
            Some((start, end)) => monitor.filter_range(start, end),
            None => monitor.without_rows(),
        }
    };

    rest.iter()
        .fold(restrict(first), |acc, monitor| {
            acc.combine_with(&restrict(monitor), JoinKind::Inner)
        })
        .drop_empty()
}

/// Latest start and earliest end across all monitors
fn overlap_window(monitors: &[Monitor]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut start = None;
    let mut end = None;

    for monitor in monitors {
        let (s, e) = (monitor.data().start()?, monitor.data().end()?);
        start = Some(start.map_or(s, |current: DateTime<Utc>| current.max(s)));
        end = Some(end.map_or(e, |current: DateTime<Utc>| current.min(e)));
    }

    match (start, end) {
        (Some(start), Some(end)) if start <= end => Some((start, end)),
        _ => None,
    }
}
