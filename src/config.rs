use std::path::PathBuf;

use anyhow::Context;
use jiff::tz::TimeZone;

#[derive(Clone, Debug)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub out_file: PathBuf,
    pub contests_override_file: PathBuf,
    pub runtimes_override_file: PathBuf,
    pub tickets_file: PathBuf,
    pub screening_tz: TimeZone,
    // Used when the grid leaves `accreditationNeeded` null and no ticket matched.
    pub accreditation_default: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let raw_dir = PathBuf::from(std::env::var("RAW_DIR").unwrap_or_else(|_| "data/raw".to_string()));
        let out_file = PathBuf::from(
            std::env::var("OUT_FILE").unwrap_or_else(|_| "data/build/db.json".to_string()),
        );
        let contests_override_file = PathBuf::from(
            std::env::var("CONTESTS_OVERRIDE_FILE")
                .unwrap_or_else(|_| "data/override/contests-override.json".to_string()),
        );
        let runtimes_override_file = PathBuf::from(
            std::env::var("RUNTIMES_OVERRIDE_FILE")
                .unwrap_or_else(|_| "data/override/runtimes-override.json".to_string()),
        );
        let tickets_file = std::env::var("TICKETS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| raw_dir.join("screenings-tickets.json"));

        let tz_name = std::env::var("SCREENING_TZ").unwrap_or_else(|_| "UTC".to_string());
        let screening_tz = if tz_name.eq_ignore_ascii_case("UTC") {
            TimeZone::UTC
        } else {
            TimeZone::get(&tz_name).with_context(|| format!("SCREENING_TZ={tz_name}"))?
        };

        let accreditation_default = std::env::var("ACCREDITATION_DEFAULT")
            .ok()
            .map(|s| s.parse::<bool>())
            .transpose()
            .context("ACCREDITATION_DEFAULT")?
            .unwrap_or(false);

        Ok(Self {
            raw_dir,
            out_file,
            contests_override_file,
            runtimes_override_file,
            tickets_file,
            screening_tz,
            accreditation_default,
        })
    }

    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let raw_dir = root.join("raw");
        Self {
            tickets_file: raw_dir.join("screenings-tickets.json"),
            raw_dir,
            out_file: root.join("build/db.json"),
            contests_override_file: root.join("override/contests-override.json"),
            runtimes_override_file: root.join("override/runtimes-override.json"),
            screening_tz: TimeZone::UTC,
            accreditation_default: false,
        }
    }
}
