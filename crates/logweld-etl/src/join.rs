//! Inner join of the two input logs on `user_id`.

use std::collections::HashMap;

use logweld_core::record::str_field;
use logweld_core::Record;

/// Inner-joins activities against API logs on `user_id`.
///
/// A lookup is built from `api_logs` keyed by `user_id`, last-write-wins on
/// duplicate keys. Each activity whose key appears in the lookup is emitted
/// as a shallow merge; log fields override activity fields on name
/// collision. Activities without a match are dropped, as are records whose
/// join key is absent or not a string.
#[must_use]
pub fn join_on_user_id(activities: &[Record], api_logs: &[Record]) -> Vec<Record> {
    let lookup: HashMap<&str, &Record> = api_logs
        .iter()
        .filter_map(|log| str_field(log, "user_id").map(|id| (id, log)))
        .collect();

    let joined: Vec<Record> = activities
        .iter()
        .filter_map(|activity| {
            let user_id = str_field(activity, "user_id")?;
            let log = lookup.get(user_id)?;
            let mut merged = activity.clone();
            for (key, value) in log.iter() {
                merged.insert(key.clone(), value.clone());
            }
            Some(merged)
        })
        .collect();

    tracing::info!(
        activities = activities.len(),
        api_logs = api_logs.len(),
        joined = joined.len(),
        "inner join on user_id complete"
    );
    joined
}
