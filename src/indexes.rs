use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ContestId, Indexes, MovieId, ScreeningRecord};

pub fn build_indexes(screenings: &[ScreeningRecord]) -> Indexes {
    let mut contest_to_movies: BTreeMap<ContestId, BTreeSet<MovieId>> = BTreeMap::new();
    let mut movie_to_contests: BTreeMap<MovieId, BTreeSet<ContestId>> = BTreeMap::new();

    for screening in screenings {
        let Some(contest_id) = screening.contest_id else { continue };
        let movies = contest_to_movies.entry(contest_id).or_default();
        for &movie_id in &screening.movie_ids {
            movies.insert(movie_id);
            movie_to_contests.entry(movie_id).or_default().insert(contest_id);
        }
    }

    Indexes {
        contest_id_to_movie_ids: into_sorted_lists(contest_to_movies),
        movie_id_to_contest_ids: into_sorted_lists(movie_to_contests),
    }
}

fn into_sorted_lists(map: BTreeMap<i64, BTreeSet<i64>>) -> BTreeMap<i64, Vec<i64>> {
    map.into_iter().map(|(k, set)| (k, set.into_iter().collect())).collect()
}
