use byre_core::models::FarmSettings;
use byre_core::timezone::validate_timezone;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Path of the farm document.
    pub data_file: PathBuf,
    /// IANA timezone the farm runs on; governs what "today" means.
    pub timezone: String,
    /// How far ahead `byre plan` projects template occurrences.
    pub horizon_days: u32,
    /// Prices and cost assumptions for the money report.
    #[serde(flatten)]
    pub farm: FarmSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("byre.json"),
            timezone: detect_system_timezone(),
            horizon_days: 120,
            farm: FarmSettings::default(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("byre.toml"))
            .merge(Env::prefixed("BYRE_"))
            .extract()
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    // Method 1: Check TZ environment variable
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    // Method 2: Try to read from /etc/timezone (Linux)
    #[cfg(target_os = "linux")]
    {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if validate_timezone(tz).is_ok() {
                return tz.to_string();
            }
        }
    }

    // Method 3: Resolve the /etc/localtime symlink (macOS)
    #[cfg(target_os = "macos")]
    {
        use std::process::Command;
        if let Ok(output) = Command::new("readlink").arg("/etc/localtime").output() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                if let Some(tz) = path.strip_prefix("/usr/share/zoneinfo/") {
                    let tz = tz.trim();
                    if validate_timezone(tz).is_ok() {
                        return tz.to_string();
                    }
                }
            }
        }
    }

    // Method 4: Platform-level detection
    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

/// Gets a list of common/popular timezones for user selection
pub fn get_common_timezones() -> Vec<&'static str> {
    vec![
        "UTC",
        "America/New_York",
        "America/Chicago",
        "America/Denver",
        "America/Los_Angeles",
        "America/Sao_Paulo",
        "Europe/London",
        "Europe/Paris",
        "Europe/Berlin",
        "Europe/Rome",
        "Europe/Madrid",
        "Asia/Tokyo",
        "Asia/Shanghai",
        "Asia/Kolkata",
        "Asia/Dubai",
        "Australia/Sydney",
        "Australia/Melbourne",
        "Pacific/Auckland",
    ]
}

/// Suggests similar timezone names when validation fails
pub fn suggest_timezone(invalid_tz: &str) -> Vec<String> {
    let common = get_common_timezones();
    let lower_invalid = invalid_tz.to_lowercase();

    let mut suggestions = Vec::new();
    for &tz in &common {
        let lower_tz = tz.to_lowercase();
        if lower_tz.contains(&lower_invalid) || lower_invalid.contains(&lower_tz) {
            suggestions.push(tz.to_string());
        }
    }

    if suggestions.is_empty() {
        suggestions.extend(common.iter().take(5).map(|s| s.to_string()));
    }

    suggestions
}
