use std::collections::{BTreeMap, HashSet};

use jiff::{civil::DateTime, tz::TimeZone};
use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    models::{
        ContestId, ContestRecord, LocationId, LocationRecord, MovieId, MovieRecord, RawScreening,
        ScreeningRecord,
    },
    normalize::TitleIndex,
    report::BuildReport,
    tickets::TicketIndex,
};

const NULL_PART: &str = "x";

pub struct ScreeningContext<'a> {
    pub movies: &'a BTreeMap<MovieId, MovieRecord>,
    pub contests: &'a BTreeMap<ContestId, ContestRecord>,
    pub locations: &'a BTreeMap<LocationId, LocationRecord>,
    pub titles: &'a TitleIndex,
    pub tz: &'a TimeZone,
    pub accreditation_default: bool,
}

pub fn start_millis(starts_at: &str, tz: &TimeZone) -> AppResult<i64> {
    let err = |source| AppError::Timestamp { starts_at: starts_at.to_string(), source };
    let civil: DateTime = starts_at.trim().parse().map_err(err)?;
    let zoned = civil.to_zoned(tz.clone()).map_err(err)?;
    Ok(zoned.timestamp().as_millisecond())
}

// `{start ms}-{location}-{contest}-{movie ids}`, ids joined with `.`, nulls as `x`.
pub fn screening_id(
    start_ms: i64,
    location_id: Option<LocationId>,
    contest_id: Option<ContestId>,
    movie_ids: &[MovieId],
) -> String {
    let part = |v: Option<i64>| v.map_or_else(|| NULL_PART.to_string(), |v| v.to_string());
    let movies = if movie_ids.is_empty() {
        NULL_PART.to_string()
    } else {
        movie_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
    };
    format!("{start_ms}-{}-{}-{movies}", part(location_id), part(contest_id))
}

pub fn normalize_screenings(
    rows: &[RawScreening],
    ctx: &ScreeningContext<'_>,
    tickets: &mut TicketIndex,
    report: &mut BuildReport,
) -> AppResult<Vec<ScreeningRecord>> {
    let mut out = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();

    for (row_no, row) in rows.iter().enumerate() {
        let mut movie_ids = row.movie_ids.clone().map(|ids| ids.into_vec()).unwrap_or_default();
        let movie_titles: Vec<String> = row
            .movie_titles
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if movie_ids.is_empty() && !movie_titles.is_empty() {
            movie_ids = resolve_titles(&movie_titles, ctx.titles, report);
        }

        if movie_ids.is_empty() && movie_titles.is_empty() && row.place_id.is_none() {
            debug!(row = row_no, starts_at = %row.starts_at, "dropping empty screening row");
            report.dropped_rows += 1;
            continue;
        }

        let start_ms = start_millis(&row.starts_at, ctx.tz)?;
        let id = screening_id(start_ms, row.place_id, row.contest_id, &movie_ids);

        if !seen.insert(id.clone()) {
            warn!(row = row_no, id = %id, "duplicate screening, keeping the first");
            report.duplicate_screenings += 1;
            continue;
        }

        let ticket_id = row.place_id.and_then(|loc| tickets.take(start_ms, loc));
        if ticket_id.is_some() {
            report.ticket_matches += 1;
        }

        let accreditation_only = match row.accreditation_needed {
            Some(flag) => {
                if flag && ticket_id.is_some() {
                    debug!(id = %id, "marked accreditation-only but a ticket exists, keeping the grid mark");
                }
                flag
            },
            None if ticket_id.is_some() => false,
            None => ctx.accreditation_default,
        };

        count_unmapped(row, &movie_ids, ctx, report);

        out.push(ScreeningRecord {
            id,
            movie_ids,
            contest_id: row.contest_id,
            location_id: row.place_id,
            starts_at: row.starts_at.clone(),
            accreditation_only,
            movie_titles,
            ticket_id,
        });
    }

    Ok(out)
}

fn resolve_titles(titles: &[String], index: &TitleIndex, report: &mut BuildReport) -> Vec<MovieId> {
    let mut ids = Vec::new();
    for title in titles {
        match index.resolve(title) {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {},
            None => *report.unresolved_titles.entry(title.clone()).or_default() += 1,
        }
    }
    if !ids.is_empty() {
        report.resolved_by_title += 1;
    }
    ids
}

fn count_unmapped(
    row: &RawScreening,
    movie_ids: &[MovieId],
    ctx: &ScreeningContext<'_>,
    report: &mut BuildReport,
) {
    for id in movie_ids.iter().filter(|id| !ctx.movies.contains_key(*id)) {
        *report.unmapped_movies.entry(*id).or_default() += 1;
    }
    if let Some(id) = row.contest_id.filter(|id| !ctx.contests.contains_key(id)) {
        *report.unmapped_contests.entry(id).or_default() += 1;
    }
    if let Some(id) = row.place_id.filter(|id| !ctx.locations.contains_key(id)) {
        *report.unmapped_locations.entry(id).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OneOrMany;

    struct Fixture {
        movies: BTreeMap<MovieId, MovieRecord>,
        contests: BTreeMap<ContestId, ContestRecord>,
        locations: BTreeMap<LocationId, LocationRecord>,
        titles: TitleIndex,
        tz: TimeZone,
    }

    impl Fixture {
        fn new() -> Self {
            let mut movies = BTreeMap::new();
            for (id, title) in [(1, "Brat"), (2, "Las"), (3, "Klarnet")] {
                movies.insert(
                    id,
                    MovieRecord {
                        id,
                        original_title: title.to_string(),
                        year: None,
                        runtime_min: None,
                        directors: None,
                    },
                );
            }
            let titles = TitleIndex::new(movies.values().map(|m| (m.id, m.original_title.as_str())));
            let mut contests = BTreeMap::new();
            contests.insert(
                5,
                ContestRecord { id: 5, name: "Konkurs".to_string(), is_visible_in_filters: true, order: None },
            );
            let mut locations = BTreeMap::new();
            locations.insert(9, LocationRecord { id: 9, name: "Sala 1".to_string() });
            Self { movies, contests, locations, titles, tz: TimeZone::UTC }
        }

        fn ctx(&self) -> ScreeningContext<'_> {
            ScreeningContext {
                movies: &self.movies,
                contests: &self.contests,
                locations: &self.locations,
                titles: &self.titles,
                tz: &self.tz,
                accreditation_default: false,
            }
        }
    }

    fn row(movie_ids: Option<OneOrMany<MovieId>>, starts_at: &str) -> RawScreening {
        RawScreening {
            movie_ids,
            movie_titles: vec![],
            contest_id: Some(5),
            place_id: Some(9),
            starts_at: starts_at.to_string(),
            accreditation_needed: Some(false),
        }
    }

    fn run(rows: &[RawScreening]) -> (Vec<ScreeningRecord>, BuildReport) {
        let fixture = Fixture::new();
        let mut report = BuildReport::default();
        let out =
            normalize_screenings(rows, &fixture.ctx(), &mut TicketIndex::default(), &mut report)
                .unwrap();
        (out, report)
    }

    #[test]
    fn start_millis_reads_civil_time_in_zone() {
        assert_eq!(start_millis("2025-09-22T18:00:00", &TimeZone::UTC).unwrap(), 1_758_564_000_000);
        let plus_two = TimeZone::fixed(jiff::tz::offset(2));
        assert_eq!(start_millis("2025-09-22T18:00", &plus_two).unwrap(), 1_758_556_800_000);
        assert!(start_millis("jutro", &TimeZone::UTC).is_err());
    }

    #[test]
    fn synthetic_id_is_delimited_and_stable() {
        assert_eq!(screening_id(1000, Some(9), Some(5), &[1]), "1000-9-5-1");
        assert_eq!(screening_id(1000, None, None, &[12, 3]), "1000-x-x-12.3");
        assert_eq!(screening_id(1000, Some(9), None, &[]), "1000-9-x-x");
        assert_ne!(screening_id(1000, Some(1), Some(23), &[4]), screening_id(1000, Some(12), Some(3), &[4]));
    }

    #[test]
    fn movie_ids_become_lists() {
        let rows = [
            row(Some(OneOrMany::One(1)), "2025-09-22T18:00:00"),
            row(Some(OneOrMany::Many(vec![2, 3])), "2025-09-22T20:00:00"),
        ];

        let (out, report) = run(&rows);

        assert_eq!(out[0].movie_ids, vec![1]);
        assert_eq!(out[0].id, "1758564000000-9-5-1");
        assert_eq!(out[1].movie_ids, vec![2, 3]);
        assert_eq!(out[1].starts_at, "2025-09-22T20:00:00");
        assert!(report.is_clean());
    }

    #[test]
    fn null_accreditation_defaults_to_ticket_required() {
        let mut r = row(Some(OneOrMany::One(1)), "2025-09-22T18:00:00");
        r.accreditation_needed = None;
        let mut marked = row(Some(OneOrMany::One(2)), "2025-09-22T18:00:00");
        marked.accreditation_needed = Some(true);

        let (out, _) = run(&[r, marked]);

        assert!(!out[0].accreditation_only);
        assert!(out[1].accreditation_only);
    }

    #[test]
    fn empty_rows_are_dropped() {
        let mut empty = row(None, "2025-09-22T18:00:00");
        empty.contest_id = None;
        empty.place_id = None;
        let mut located = row(None, "2025-09-22T19:00:00");
        located.contest_id = None;

        let (out, report) = run(&[empty, located]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].location_id, Some(9));
        assert!(out[0].movie_ids.is_empty());
        assert_eq!(report.dropped_rows, 1);
    }

    #[test]
    fn titles_resolve_missing_ids() {
        let mut r = row(None, "2025-09-22T18:00:00");
        r.movie_titles = vec!["BRAT".to_string(), "„Las”".to_string(), "Nieznany".to_string()];

        let (out, report) = run(&[r]);

        assert_eq!(out[0].movie_ids, vec![1, 2]);
        assert_eq!(out[0].movie_titles.len(), 3);
        assert_eq!(report.resolved_by_title, 1);
        assert_eq!(report.unresolved_titles.get("Nieznany"), Some(&1));
    }

    #[test]
    fn unknown_references_are_counted_not_fatal() {
        let mut r = row(Some(OneOrMany::Many(vec![1, 42])), "2025-09-22T18:00:00");
        r.contest_id = Some(77);
        r.place_id = Some(88);
        let mut again = row(Some(OneOrMany::One(42)), "2025-09-23T18:00:00");
        again.place_id = Some(88);

        let (out, report) = run(&[r, again]);

        assert_eq!(out.len(), 2);
        assert_eq!(report.unmapped_movies.get(&42), Some(&2));
        assert_eq!(report.unmapped_contests.get(&77), Some(&1));
        assert_eq!(report.unmapped_locations.get(&88), Some(&2));
        assert_eq!(report.unmapped_reference_count(), 5);
    }

    #[test]
    fn duplicate_rows_keep_the_first() {
        let first = row(Some(OneOrMany::One(1)), "2025-09-22T18:00:00");
        let mut second = first.clone();
        second.accreditation_needed = Some(true);

        let (out, report) = run(&[first, second]);

        assert_eq!(out.len(), 1);
        assert!(!out[0].accreditation_only);
        assert_eq!(report.duplicate_screenings, 1);
    }
}
