use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::models::{ContestId, LocationId, MovieId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    pub unmapped_movies: BTreeMap<MovieId, usize>,
    pub unmapped_contests: BTreeMap<ContestId, usize>,
    pub unmapped_locations: BTreeMap<LocationId, usize>,
    pub unresolved_titles: BTreeMap<String, usize>,
    pub resolved_by_title: usize,
    pub runtime_failures: Vec<(String, String)>,
    pub runtimes_from_overrides: usize,
    pub duplicate_movie_rows: usize,
    pub dropped_rows: usize,
    pub duplicate_screenings: usize,
    pub ticket_matches: usize,
    pub unmatched_tickets: usize,
}

impl BuildReport {
    pub fn unmapped_reference_count(&self) -> usize {
        self.unmapped_movies.values().sum::<usize>()
            + self.unmapped_contests.values().sum::<usize>()
            + self.unmapped_locations.values().sum::<usize>()
    }

    pub fn is_clean(&self) -> bool {
        self.unmapped_reference_count() == 0
            && self.unresolved_titles.is_empty()
            && self.runtime_failures.is_empty()
            && self.duplicate_screenings == 0
            && self.unmatched_tickets == 0
    }

    pub fn log_summary(&self) {
        if !self.unmapped_movies.is_empty() {
            warn!(
                references = self.unmapped_movies.values().sum::<usize>(),
                ids = ?self.unmapped_movies.keys().collect::<Vec<_>>(),
                "screenings reference movies missing from both movie sources"
            );
        }
        if !self.unmapped_contests.is_empty() {
            warn!(ids = ?self.unmapped_contests.keys().collect::<Vec<_>>(), "unknown contest ids in screenings");
        }
        if !self.unmapped_locations.is_empty() {
            warn!(ids = ?self.unmapped_locations.keys().collect::<Vec<_>>(), "unknown location ids in screenings");
        }
        if !self.unresolved_titles.is_empty() {
            warn!(titles = ?self.unresolved_titles.keys().collect::<Vec<_>>(), "screening titles without a movie id");
        }
        for (movie, text) in &self.runtime_failures {
            warn!(movie = %movie, input = %text, "runtime needs manual follow-up");
        }
        if self.duplicate_screenings > 0 {
            warn!(count = self.duplicate_screenings, "duplicate screenings dropped");
        }
        if self.unmatched_tickets > 0 {
            warn!(count = self.unmatched_tickets, "ticket rows not matched to any screening");
        }

        info!(
            unmapped_references = self.unmapped_reference_count(),
            resolved_by_title = self.resolved_by_title,
            runtimes_from_overrides = self.runtimes_from_overrides,
            duplicate_movie_rows = self.duplicate_movie_rows,
            dropped_rows = self.dropped_rows,
            ticket_matches = self.ticket_matches,
            "build report"
        );
    }
}
