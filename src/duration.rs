use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(godz\.?|g|h)").unwrap());
static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(min\.?|m)").unwrap());
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,3}").unwrap());

pub fn parse_runtime_minutes(text: Option<&str>, label: &str) -> Option<u32> {
    let Some(text) = text else {
        debug!(movie = %label, "runtime text missing");
        return None;
    };

    let normalized = text.replace('\u{00A0}', " ").trim().to_lowercase();
    if normalized.is_empty() {
        warn!(movie = %label, input = ?text, "runtime text empty after normalization");
        return None;
    }

    let hours_match = HOURS.captures(&normalized);
    let minutes_match = MINUTES.captures(&normalized);

    let mut hours: u32 = 0;
    let mut minutes: u32 = 0;

    if let Some(caps) = &hours_match {
        let Ok(h) = caps[1].parse() else {
            warn!(movie = %label, input = ?text, captured = &caps[1], "unparseable hours");
            return None;
        };
        hours = h;
    }
    if let Some(caps) = &minutes_match {
        let Ok(m) = caps[1].parse() else {
            warn!(movie = %label, input = ?text, captured = &caps[1], "unparseable minutes");
            return None;
        };
        minutes = m;
    }

    let mut used_fallback = false;
    if hours_match.is_none() && minutes_match.is_none() {
        let Some(bare) = BARE_NUMBER.find(&normalized) else {
            warn!(movie = %label, input = ?text, "no hour/minute markers and no number in runtime");
            return None;
        };
        // At most three digits, always fits.
        minutes = bare.as_str().parse().unwrap_or(0);
        used_fallback = true;
    }

    let total = hours.checked_mul(60).and_then(|h| h.checked_add(minutes));
    let total = match total {
        Some(t) if t > 0 => t,
        _ => {
            warn!(movie = %label, input = ?text, hours, minutes, "runtime is not positive");
            return None;
        },
    };

    if used_fallback {
        debug!(movie = %label, input = ?text, total, "bare number read as minutes");
    }

    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<u32> {
        parse_runtime_minutes(Some(text), "test")
    }

    #[test]
    fn hour_and_minute_markers() {
        assert_eq!(parse("1 godz. 20 min"), Some(80));
        assert_eq!(parse("1 godz 20 min"), Some(80));
        assert_eq!(parse("1g 20m"), Some(80));
        assert_eq!(parse("1 h 5 m"), Some(65));
        assert_eq!(parse("1h"), Some(60));
        assert_eq!(parse("2h"), Some(120));
        assert_eq!(parse("45 min"), Some(45));
        assert_eq!(parse("80 min."), Some(80));
        assert_eq!(parse("2 GODZ. 13 MIN"), Some(133));
    }

    #[test]
    fn nbsp_and_padding() {
        assert_eq!(parse("\u{00A0}1\u{00A0}godz.\u{00A0}38\u{00A0}min "), Some(98));
    }

    #[test]
    fn bare_number_fallback() {
        assert_eq!(parse("80"), Some(80));
        assert_eq!(parse("ok. 95"), Some(95));
        assert_eq!(parse("1234"), Some(123));
    }

    #[test]
    fn rejects_empty_and_non_positive() {
        assert_eq!(parse_runtime_minutes(None, "test"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("abc"), None);
        assert_eq!(parse("0"), None);
        assert_eq!(parse("0 min"), None);
        assert_eq!(parse("0h 0m"), None);
    }

    #[test]
    fn oversized_components_give_none() {
        assert_eq!(parse("99999999999 min"), None);
        assert_eq!(parse("99999999999 h 5 min"), None);
        assert_eq!(parse("2 h 99999999999 min"), None);
        assert_eq!(parse("71582789 h"), None);
    }
}
