use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::{
    duration::parse_runtime_minutes,
    models::{
        ContestId, ContestOverride, ContestRecord, ContestsOverride, LocationId, LocationRecord,
        MovieId, MovieRecord, OneOrMany, RawContest, RawLocation, RawMovie, RawMovieMeta,
        RuntimeValue, RuntimesOverride,
    },
    normalize::normalize_key,
    report::BuildReport,
};

pub fn merge_movies(
    movie_list: &[RawMovie],
    movies_meta: &[RawMovieMeta],
    runtime_overrides: &RuntimesOverride,
    report: &mut BuildReport,
) -> BTreeMap<MovieId, MovieRecord> {
    let mut titles: BTreeMap<MovieId, &str> = BTreeMap::new();
    for m in movie_list {
        if let Some(previous) = titles.insert(m.id, m.original_title.trim()) {
            warn!(id = m.id, previous = %previous, title = %m.original_title, "duplicate id in movie list, last title wins");
            report.duplicate_movie_rows += 1;
        }
    }

    let meta_by_id: HashMap<MovieId, &RawMovieMeta> =
        movies_meta.iter().map(|m| (m.id, m)).collect();

    let mut movies = BTreeMap::new();

    for (&id, &title) in &titles {
        let record = match meta_by_id.get(&id) {
            Some(meta) => movie_from_meta(meta, title, report),
            None => MovieRecord {
                id,
                original_title: title.to_string(),
                year: None,
                runtime_min: None,
                directors: None,
            },
        };
        movies.insert(id, record);
    }

    for meta in movies_meta {
        if movies.contains_key(&meta.id) {
            continue;
        }
        debug!(id = meta.id, title = %meta.original_title, "movie known only from metadata");
        let record = movie_from_meta(meta, meta.original_title.trim(), report);
        movies.insert(meta.id, record);
    }

    apply_runtime_overrides(&mut movies, runtime_overrides, report);

    movies
}

fn movie_from_meta(meta: &RawMovieMeta, title: &str, report: &mut BuildReport) -> MovieRecord {
    let runtime_min = match meta.runtime_min {
        Some(min) if min > 0 => u32::try_from(min).ok(),
        Some(min) => {
            warn!(id = meta.id, runtime_min = min, "ignoring non-positive runtime");
            None
        },
        None => None,
    };
    let runtime_min = runtime_min.or_else(|| {
        let text = meta.runtime.as_deref().filter(|t| !t.trim().is_empty())?;
        let parsed = parse_runtime_minutes(Some(text), title);
        if parsed.is_none() {
            report.runtime_failures.push((title.to_string(), text.to_string()));
        }
        parsed
    });

    MovieRecord {
        id: meta.id,
        original_title: title.to_string(),
        year: meta.year,
        runtime_min,
        directors: meta.directors.clone().map(normalize_directors),
    }
}

pub fn normalize_directors(directors: OneOrMany<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    directors
        .into_vec()
        .into_iter()
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

fn apply_runtime_overrides(
    movies: &mut BTreeMap<MovieId, MovieRecord>,
    overrides: &RuntimesOverride,
    report: &mut BuildReport,
) {
    if overrides.runtimes.is_empty() {
        return;
    }

    let mut by_key: HashMap<String, (&str, &RuntimeValue)> = HashMap::new();
    for (title, value) in &overrides.runtimes {
        by_key.insert(normalize_key(title), (title.as_str(), value));
    }

    for movie in movies.values_mut().filter(|m| m.runtime_min.is_none()) {
        let Some((title, value)) = by_key.get(&normalize_key(&movie.original_title)) else {
            continue;
        };
        let minutes = match value {
            RuntimeValue::Minutes(min) => u32::try_from(*min).ok().filter(|m| *m > 0),
            RuntimeValue::Text(text) => parse_runtime_minutes(Some(text.as_str()), title),
        };
        match minutes {
            Some(min) => {
                debug!(id = movie.id, runtime_min = min, "runtime taken from override");
                movie.runtime_min = Some(min);
                report.runtimes_from_overrides += 1;
            },
            None => {
                let text = match value {
                    RuntimeValue::Minutes(min) => min.to_string(),
                    RuntimeValue::Text(text) => text.clone(),
                };
                report.runtime_failures.push((title.to_string(), text));
            },
        }
    }
}

pub fn resolve_contest(scraped: &RawContest, ov: Option<&ContestOverride>) -> ContestRecord {
    ContestRecord {
        id: scraped.contest_id,
        name: ov
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| scraped.contest_name.trim().to_string()),
        is_visible_in_filters: ov.and_then(|o| o.is_visible_in_filters).unwrap_or(true),
        order: ov.and_then(|o| o.order),
    }
}

pub fn merge_contests(
    contests: &[RawContest],
    overrides: &ContestsOverride,
) -> BTreeMap<ContestId, ContestRecord> {
    let mut out: BTreeMap<ContestId, ContestRecord> = BTreeMap::new();
    for c in contests {
        let record = resolve_contest(c, overrides.items.get(&c.contest_id));
        match out.get(&c.contest_id) {
            Some(existing) if !existing.name.is_empty() || record.name.is_empty() => {
                debug!(id = c.contest_id, "duplicate contest row ignored");
            },
            _ => {
                out.insert(c.contest_id, record);
            },
        }
    }
    out
}

pub fn merge_locations(locations: &[RawLocation]) -> BTreeMap<LocationId, LocationRecord> {
    let mut out: BTreeMap<LocationId, LocationRecord> = BTreeMap::new();
    for l in locations {
        let name = l.location_name.split_whitespace().collect::<Vec<_>>().join(" ");
        match out.get_mut(&l.location_id) {
            Some(existing) if existing.name.is_empty() && !name.is_empty() => {
                existing.name = name;
            },
            Some(_) => {},
            None => {
                out.insert(l.location_id, LocationRecord { id: l.location_id, name });
            },
        }
    }
    out
}
