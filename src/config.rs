use std::collections::HashMap;
use std::fs;

use chrono::{Local, NaiveDate};

use crate::error::ConfigError;
use crate::models::layout::{Layout, LayoutProfile};
use crate::service::interval::EventPolicy;

pub const DEFAULT_USER: &str = "local";
pub const DEFAULT_EXPORT_PATH: &str = "./data/schedule.json";

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile(e.to_string()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    pub layouts: Vec<Layout>,
    pub anchor: NaiveDate,
    /// Failed inputs tolerated per question; `None` asks forever.
    pub max_attempts: Option<u32>,
    pub policy: EventPolicy,
    pub user: String,
    pub export_path: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            layouts: LayoutProfile::default().layouts(),
            anchor: Local::now().date_naive(),
            max_attempts: None,
            policy: EventPolicy::default(),
            user: DEFAULT_USER.to_string(),
            export_path: DEFAULT_EXPORT_PATH.to_string(),
        }
    }
}

impl PlannerSettings {
    pub fn resolve<F>(get_prop: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(profile) = get_prop("LAYOUT_PROFILE") {
            settings.layouts = profile
                .parse::<LayoutProfile>()
                .map_err(|_| invalid("LAYOUT_PROFILE", &profile))?
                .layouts();
        }
        if let Some(custom) = get_prop("LAYOUTS") {
            settings.layouts = parse_layouts(&custom)?;
        }
        if let Some(anchor) = get_prop("REFERENCE_DATE") {
            settings.anchor = NaiveDate::parse_from_str(anchor.trim(), "%Y-%m-%d")
                .map_err(|_| invalid("REFERENCE_DATE", &anchor))?;
        }
        if let Some(attempts) = get_prop("MAX_ATTEMPTS") {
            let parsed = attempts
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid("MAX_ATTEMPTS", &attempts))?;
            settings.max_attempts = (parsed > 0).then_some(parsed);
        }
        if let Some(flag) = get_prop("EVENT_CONTAINMENT") {
            settings.policy.containment = parse_flag("EVENT_CONTAINMENT", &flag)?;
        }
        if let Some(flag) = get_prop("EVENT_OVERLAP") {
            settings.policy.reject_overlap = match flag.trim().to_ascii_lowercase().as_str() {
                "allow" => false,
                "reject" => true,
                _ => return Err(invalid("EVENT_OVERLAP", &flag)),
            };
        }
        if let Some(user) = get_prop("PLANNER_USER").filter(|u| !u.trim().is_empty()) {
            settings.user = user.trim().to_string();
        }
        if let Some(path) = get_prop("EXPORT_PATH").filter(|p| !p.trim().is_empty()) {
            settings.export_path = path.trim().to_string();
        }
        Ok(settings)
    }
}

pub fn parse_layouts(raw: &str) -> Result<Vec<Layout>, ConfigError> {
    let layouts = raw
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (pattern, time_only) = entry.split_once('|').ok_or_else(|| invalid("LAYOUTS", entry))?;
            Layout::checked(pattern.trim(), time_only.trim()).ok_or_else(|| invalid("LAYOUTS", entry))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if layouts.is_empty() {
        return Err(invalid("LAYOUTS", raw));
    }
    Ok(layouts)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn parses_env_style_file() {
        let config = AppConfig::parse(
            "# planner\nexport LAYOUT_PROFILE=\"weekday\"\nMAX_ATTEMPTS = 3\n\nPLANNER_USER='ada'\n",
        )
        .unwrap();
        assert_eq!(config.get("LAYOUT_PROFILE").as_deref(), Some("weekday"));
        assert_eq!(config.get("MAX_ATTEMPTS").as_deref(), Some("3"));
        assert_eq!(config.get("PLANNER_USER").as_deref(), Some("ada"));
    }

    #[test]
    fn rejects_lines_without_assignment() {
        let err = AppConfig::parse("LAYOUT_PROFILE\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidLine {
                line: 1,
                content: "LAYOUT_PROFILE".to_string()
            }
        );
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        assert!(AppConfig::load(None).unwrap().get("LAYOUT_PROFILE").is_none());

        let dir = std::env::temp_dir().join(format!("dayplanner_config_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let missing = dir.join("missing.env");
        assert!(matches!(
            AppConfig::load(missing.to_str()),
            Err(ConfigError::ReadFile(_))
        ));

        let malformed = dir.join("planner.env");
        fs::write(&malformed, "MAX_ATTEMPTS=3\nEVENT_OVERLAP reject\n").unwrap();
        assert_eq!(
            AppConfig::load(malformed.to_str()).unwrap_err(),
            ConfigError::InvalidLine {
                line: 2,
                content: "EVENT_OVERLAP reject".to_string()
            }
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolves_typed_settings() {
        let settings = PlannerSettings::resolve(lookup(&[
            ("LAYOUT_PROFILE", "weekday"),
            ("REFERENCE_DATE", "2026-01-07"),
            ("MAX_ATTEMPTS", "5"),
            ("EVENT_CONTAINMENT", "yes"),
            ("EVENT_OVERLAP", "reject"),
            ("PLANNER_USER", "ada"),
        ]))
        .unwrap();
        assert_eq!(settings.layouts, LayoutProfile::Weekday.layouts());
        assert_eq!(settings.anchor, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
        assert_eq!(settings.max_attempts, Some(5));
        assert!(settings.policy.containment);
        assert!(settings.policy.reject_overlap);
        assert_eq!(settings.user, "ada");
    }

    #[test]
    fn zero_attempts_means_unlimited() {
        let settings = PlannerSettings::resolve(lookup(&[("MAX_ATTEMPTS", "0")])).unwrap();
        assert_eq!(settings.max_attempts, None);
    }

    #[test]
    fn custom_layouts_override_profile() {
        let settings = PlannerSettings::resolve(lookup(&[
            ("LAYOUT_PROFILE", "weekday"),
            ("LAYOUTS", "%d.%m. %H:%M|%H:%M; %d.%m. %Hh|%Hh"),
        ]))
        .unwrap();
        assert_eq!(
            settings.layouts,
            vec![
                Layout::new("%d.%m. %H:%M", "%H:%M"),
                Layout::new("%d.%m. %Hh", "%Hh"),
            ]
        );
    }

    #[test]
    fn reports_invalid_values() {
        assert!(PlannerSettings::resolve(lookup(&[("LAYOUT_PROFILE", "iso")])).is_err());
        assert!(PlannerSettings::resolve(lookup(&[("REFERENCE_DATE", "07/01/2026")])).is_err());
        assert!(PlannerSettings::resolve(lookup(&[("EVENT_OVERLAP", "maybe")])).is_err());
        assert!(PlannerSettings::resolve(lookup(&[("LAYOUTS", "%H:%M")])).is_err());
        assert!(PlannerSettings::resolve(lookup(&[("LAYOUTS", ";")])).is_err());
    }
}
