use std::time::Instant;

use jiff::{Timestamp, tz::TimeZone};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::AppResult,
    indexes::build_indexes,
    merge::{merge_contests, merge_locations, merge_movies},
    models::{CanonicalDb, ContestsOverride, RawInputs, RuntimesOverride, SCHEMA_VERSION},
    normalize::TitleIndex,
    overrides, schema,
    report::BuildReport,
    screenings::{ScreeningContext, normalize_screenings},
    source::{read_json, read_optional_json},
    tickets::TicketIndex,
};

#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub screening_tz: TimeZone,
    pub accreditation_default: bool,
}

impl From<&Config> for BuildOptions {
    fn from(config: &Config) -> Self {
        Self {
            screening_tz: config.screening_tz.clone(),
            accreditation_default: config.accreditation_default,
        }
    }
}

pub fn load_inputs(config: &Config) -> AppResult<RawInputs> {
    let dir = &config.raw_dir;

    let movie_list = read_json(&dir.join("movie-list.json"), &schema::movie_list())?;
    let movies_meta = read_json(&dir.join("movies-meta.json"), &schema::movies_meta())?;
    let locations = read_json(&dir.join("locations.json"), &schema::locations())?;
    let contests = read_json(&dir.join("contests.json"), &schema::contests())?;
    let screenings = read_json(&dir.join("screenings.json"), &schema::screenings())?;
    let tickets = read_optional_json(&config.tickets_file, &schema::tickets())?.unwrap_or_default();

    let inputs = RawInputs { movie_list, movies_meta, locations, contests, screenings, tickets };
    debug!(
        movies = inputs.movie_list.len(),
        meta = inputs.movies_meta.len(),
        locations = inputs.locations.len(),
        contests = inputs.contests.len(),
        screenings = inputs.screenings.len(),
        tickets = inputs.tickets.len(),
        "raw inputs loaded"
    );
    Ok(inputs)
}

pub fn build_dataset(
    inputs: &RawInputs,
    contest_overrides: &ContestsOverride,
    runtime_overrides: &RuntimesOverride,
    options: &BuildOptions,
    generated_at: Timestamp,
) -> AppResult<(CanonicalDb, BuildReport)> {
    let mut report = BuildReport::default();

    let movies_by_id =
        merge_movies(&inputs.movie_list, &inputs.movies_meta, runtime_overrides, &mut report);
    let contests_by_id = merge_contests(&inputs.contests, contest_overrides);
    let locations_by_id = merge_locations(&inputs.locations);

    let titles = TitleIndex::new(movies_by_id.values().map(|m| (m.id, m.original_title.as_str())));
    for key in titles.ambiguous_keys() {
        warn!(title = %key, "title shared by several movie ids, not used for matching");
    }

    let mut tickets = TicketIndex::build(&inputs.tickets, &locations_by_id, &options.screening_tz);

    let ctx = ScreeningContext {
        movies: &movies_by_id,
        contests: &contests_by_id,
        locations: &locations_by_id,
        titles: &titles,
        tz: &options.screening_tz,
        accreditation_default: options.accreditation_default,
    };
    let screenings = normalize_screenings(&inputs.screenings, &ctx, &mut tickets, &mut report)?;
    tickets.record_leftovers(&mut report);

    let indexes = build_indexes(&screenings);

    let db = CanonicalDb {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at,
        movies_by_id,
        contests_by_id,
        locations_by_id,
        screenings,
        indexes,
    };
    Ok((db, report))
}

pub fn run(config: &Config) -> AppResult<BuildReport> {
    let started = Instant::now();

    let inputs = load_inputs(config)?;
    let contest_overrides =
        overrides::load_or_initialize(&config.contests_override_file, &inputs.contests)?;
    let runtime_overrides = overrides::load_runtime_overrides(&config.runtimes_override_file)?;

    let (db, report) = build_dataset(
        &inputs,
        &contest_overrides,
        &runtime_overrides,
        &BuildOptions::from(config),
        Timestamp::now(),
    )?;

    report.log_summary();

    crate::source::write_json(&config.out_file, &db)?;
    info!(
        path = %config.out_file.display(),
        movies = db.movies_by_id.len(),
        contests = db.contests_by_id.len(),
        locations = db.locations_by_id.len(),
        screenings = db.screenings.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "canonical dataset written"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OneOrMany, RawContest, RawLocation, RawMovie, RawMovieMeta, RawScreening};

    fn sample_inputs() -> RawInputs {
        RawInputs {
            movie_list: vec![RawMovie { id: 1, original_title: "Brat".to_string() }],
            movies_meta: vec![RawMovieMeta {
                id: 1,
                original_title: "Brat".to_string(),
                directors: Some(OneOrMany::One("J. Kowalski".to_string())),
                year: Some(2024),
                runtime_min: Some(98),
                runtime: None,
                url: None,
            }],
            locations: vec![RawLocation { location_id: 9, location_name: "Sala 1".to_string() }],
            contests: vec![RawContest { contest_id: 5, contest_name: "Konkurs Główny".to_string() }],
            screenings: vec![RawScreening {
                movie_ids: Some(OneOrMany::One(1)),
                movie_titles: vec![],
                contest_id: Some(5),
                place_id: Some(9),
                starts_at: "2025-09-22T18:00:00".to_string(),
                accreditation_needed: Some(false),
            }],
            tickets: vec![],
        }
    }

    fn options() -> BuildOptions {
        BuildOptions { screening_tz: TimeZone::UTC, accreditation_default: false }
    }

    #[test]
    fn builds_the_reference_dataset() {
        let generated_at: Timestamp = "2025-09-01T00:00:00Z".parse().unwrap();
        let (db, report) = build_dataset(
            &sample_inputs(),
            &ContestsOverride::default(),
            &RuntimesOverride::default(),
            &options(),
            generated_at,
        )
        .unwrap();

        assert_eq!(db.schema_version, "1.0.0");
        assert_eq!(db.movies_by_id[&1].runtime_min, Some(98));
        assert_eq!(db.movies_by_id[&1].directors, Some(vec!["J. Kowalski".to_string()]));
        assert_eq!(db.contests_by_id[&5].name, "Konkurs Główny");
        assert_eq!(db.locations_by_id[&9].name, "Sala 1");
        assert_eq!(db.screenings.len(), 1);
        assert_eq!(db.screenings[0].movie_ids, vec![1]);
        assert_eq!(db.indexes.contest_id_to_movie_ids[&5], vec![1]);
        assert_eq!(db.indexes.movie_id_to_contest_ids[&1], vec![5]);
        assert!(report.is_clean());
    }

    #[test]
    fn rebuilds_are_deterministic() {
        let generated_at = Timestamp::UNIX_EPOCH;
        let build = || {
            build_dataset(
                &sample_inputs(),
                &ContestsOverride::default(),
                &RuntimesOverride::default(),
                &options(),
                generated_at,
            )
            .unwrap()
            .0
        };

        let first = serde_json::to_string(&build()).unwrap();
        let second = serde_json::to_string(&build()).unwrap();
        assert_eq!(first, second);
    }
}
