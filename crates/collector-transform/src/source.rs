//! Fetching records window by window.

use collector_model::TimeWindow;
use tracing::info;

/// Anything that can return the records for one time window.
///
/// Provider adapters implement this; the pipeline only sees the records.
pub trait RecordSource {
    type Record;
    type Error;

    fn fetch(&self, window: &TimeWindow) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Fetch every window in order and concatenate the results.
pub fn query_for_range<S: RecordSource + ?Sized>(
    source: &S,
    windows: &[TimeWindow],
) -> Result<Vec<S::Record>, S::Error> {
    let mut records = Vec::new();
    for window in windows {
        let fetched = source.fetch(window)?;
        info!(
            start = %window.start,
            end = %window.end,
            records = fetched.len(),
            "fetched window"
        );
        records.extend(fetched);
    }
    Ok(records)
}
