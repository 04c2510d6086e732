use std::collections::{BTreeMap, HashMap};

use jiff::tz::TimeZone;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    models::{LocationId, LocationRecord, RawTicket},
    normalize::normalize_key,
    report::BuildReport,
    screenings::start_millis,
};

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").unwrap());

pub fn build_starts_at(date: &str, time: &str) -> Option<String> {
    let (date, time) = (date.trim(), time.trim());
    (DATE.is_match(date) && TIME.is_match(time)).then(|| format!("{date}T{time}"))
}

pub fn location_key(place: &str, room: &str) -> String {
    format!("{place} {room}").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Default)]
pub struct TicketIndex {
    by_slot: HashMap<(i64, LocationId), String>,
    unusable: usize,
}

impl TicketIndex {
    pub fn build(
        tickets: &[RawTicket],
        locations: &BTreeMap<LocationId, LocationRecord>,
        tz: &TimeZone,
    ) -> Self {
        let mut names: HashMap<String, LocationId> = HashMap::new();
        for loc in locations.values().filter(|l| !l.name.is_empty()) {
            names.entry(normalize_key(&loc.name)).or_insert(loc.id);
        }

        let mut index = Self::default();
        for ticket in tickets {
            let location = ticket
                .location_name
                .as_deref()
                .and_then(|name| names.get(&normalize_key(name)))
                .or_else(|| names.get(&normalize_key(&location_key(&ticket.place, &ticket.room))))
                .copied();
            let Some(location) = location else {
                warn!(
                    ticket = %ticket.screening_id,
                    place = %location_key(&ticket.place, &ticket.room),
                    "ticket location does not match any known location"
                );
                index.unusable += 1;
                continue;
            };

            let starts_at =
                ticket.starts_at.clone().or_else(|| build_starts_at(&ticket.date, &ticket.time));
            let Some(start_ms) = starts_at.as_deref().and_then(|s| start_millis(s, tz).ok()) else {
                warn!(ticket = %ticket.screening_id, date = %ticket.date, time = %ticket.time, "invalid ticket date/time");
                index.unusable += 1;
                continue;
            };

            if index.by_slot.contains_key(&(start_ms, location)) {
                debug!(ticket = %ticket.screening_id, "second ticket for the same slot ignored");
                index.unusable += 1;
                continue;
            }
            index.by_slot.insert((start_ms, location), ticket.screening_id.clone());
        }
        index
    }

    pub fn take(&mut self, start_ms: i64, location: LocationId) -> Option<String> {
        self.by_slot.remove(&(start_ms, location))
    }

    pub fn leftover(&self) -> usize {
        self.unusable + self.by_slot.len()
    }

    pub fn record_leftovers(&self, report: &mut BuildReport) {
        report.unmatched_tickets += self.leftover();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str, date: &str, time: &str, place: &str, room: &str) -> RawTicket {
        RawTicket {
            screening_id: id.to_string(),
            title: "Brat".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            room: room.to_string(),
            place: place.to_string(),
            location_name: None,
            starts_at: None,
        }
    }

    fn locations() -> BTreeMap<LocationId, LocationRecord> {
        let mut out = BTreeMap::new();
        out.insert(9, LocationRecord { id: 9, name: "KH Sala 1".to_string() });
        out.insert(10, LocationRecord { id: 10, name: "Teatr Muzyczny - Nowa Scena".to_string() });
        out
    }

    #[test]
    fn builds_starts_at_from_parts() {
        assert_eq!(build_starts_at(" 2025-09-22 ", "09:30"), Some("2025-09-22T09:30".to_string()));
        assert_eq!(build_starts_at("22.09.2025", "09:30"), None);
        assert_eq!(build_starts_at("2025-09-22", "9:30"), None);
    }

    #[test]
    fn location_key_collapses_spaces() {
        assert_eq!(location_key(" KH ", "SALA   1"), "KH SALA 1");
    }

    #[test]
    fn matches_by_slot_and_tracks_leftovers() {
        let mut mapped = ticket("T2", "2025-09-22", "20:00", "TM", "SCENA NOWA");
        mapped.location_name = Some("Teatr Muzyczny - Nowa Scena".to_string());
        let tickets = [
            ticket("T1", "2025-09-22", "18:00", "KH", "SALA 1"),
            mapped,
            ticket("T3", "2025-09-22", "18:00", "GCF", "GOPLANA"),
            ticket("T4", "bad", "18:00", "KH", "SALA 1"),
        ];

        let mut index = TicketIndex::build(&tickets, &locations(), &TimeZone::UTC);

        assert_eq!(index.take(1_758_564_000_000, 9), Some("T1".to_string()));
        assert_eq!(index.take(1_758_564_000_000, 9), None);
        assert_eq!(index.take(1_758_571_200_000, 10), Some("T2".to_string()));
        assert_eq!(index.leftover(), 2);

        let mut report = BuildReport::default();
        index.record_leftovers(&mut report);
        assert_eq!(report.unmatched_tickets, 2);
    }
}
