use std::path::Path;

use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{ContestOverride, ContestsOverride, RawContest, RuntimesOverride},
    schema, source,
};

// Gap left between seeded orders for manual reordering.
const ORDER_STEP: i64 = 10;

pub fn load_or_initialize(path: &Path, contests: &[RawContest]) -> AppResult<ContestsOverride> {
    let shape = schema::contests_override();
    let loaded = source::read_optional_json::<ContestsOverride>(path, &shape).map_err(|err| {
        AppError::OverrideInvalid { path: path.to_path_buf(), source: Box::new(err) }
    })?;

    let Some(mut overrides) = loaded else {
        let initial = scaffold(contests);
        source::write_json(path, &initial)?;
        info!(path = %path.display(), contests = initial.items.len(), "created contest override scaffold");
        return Ok(initial);
    };

    if sync_missing(&mut overrides, contests) > 0 {
        source::write_json(path, &overrides)?;
        info!(path = %path.display(), "contest overrides synced with new contests");
    } else {
        debug!(path = %path.display(), "contest overrides up to date");
    }
    Ok(overrides)
}

pub fn scaffold(contests: &[RawContest]) -> ContestsOverride {
    let mut out = ContestsOverride::default();
    let mut order = ORDER_STEP;
    for c in contests {
        if out.items.contains_key(&c.contest_id) {
            continue;
        }
        out.items.insert(
            c.contest_id,
            ContestOverride {
                is_visible_in_filters: Some(true),
                order: Some(order),
                name: Some(c.contest_name.trim().to_string()),
            },
        );
        order += ORDER_STEP;
    }
    out
}

pub fn sync_missing(overrides: &mut ContestsOverride, contests: &[RawContest]) -> usize {
    let mut added = 0;
    for c in contests {
        if !overrides.items.contains_key(&c.contest_id) {
            overrides.items.insert(c.contest_id, ContestOverride::default());
            debug!(id = c.contest_id, name = %c.contest_name, "new contest added to overrides");
            added += 1;
        }
    }
    added
}

pub fn load_runtime_overrides(path: &Path) -> AppResult<RuntimesOverride> {
    let loaded = source::read_optional_json::<RuntimesOverride>(path, &schema::runtimes_override())
        .map_err(|err| AppError::OverrideInvalid { path: path.to_path_buf(), source: Box::new(err) })?;
    Ok(loaded.unwrap_or_default())
}
