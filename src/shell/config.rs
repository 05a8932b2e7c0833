// Settings read from the environment.
//
// Parsing goes through a key lookup so tests never touch the process environment.
// Empty values count as unset.

use crate::modules::schedule::core::schedule_config::{Role, ScheduleConfig};
use crate::modules::schedule::core::slot::{SlotGranularity, WorkingHours, WorkingHoursError};
use crate::modules::schedule::core::week_window::WeekAnchor;
use crate::shared::infrastructure::appointment_service::rest::{
    Credentials, MEMBER_APPOINTMENTS_PATH, PT_APPOINTMENTS_PATH,
};
use chrono::FixedOffset;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    WorkingHours(#[from] WorkingHoursError),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub credentials: Credentials,
    pub schedule: ScheduleConfig,
    pub listen_addr: SocketAddr,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(SettingsError::Missing(key));

        let role = match get("SCHEDULE_ROLE") {
            None => Role::Member,
            Some(raw) => parse_role(&raw).ok_or(SettingsError::Invalid {
                key: "SCHEDULE_ROLE",
                value: raw,
            })?,
        };

        let start_hour: u32 = parse_or(&get, "SCHEDULE_START_HOUR", 9)?;
        let end_hour: u32 = parse_or(&get, "SCHEDULE_END_HOUR", 17)?;
        let slot_minutes: u32 = parse_or(&get, "SCHEDULE_SLOT_MINUTES", 60)?;
        let granularity =
            SlotGranularity::from_minutes(slot_minutes).ok_or(SettingsError::Invalid {
                key: "SCHEDULE_SLOT_MINUTES",
                value: slot_minutes.to_string(),
            })?;
        let working_hours = WorkingHours::between_hours(start_hour, end_hour, granularity)?;

        let week_anchor = match get("SCHEDULE_WEEK_ANCHOR").map(|v| v.trim().to_ascii_lowercase()) {
            None => WeekAnchor::Today,
            Some(raw) => match raw.as_str() {
                "today" => WeekAnchor::Today,
                "monday" => WeekAnchor::Monday,
                _ => {
                    return Err(SettingsError::Invalid {
                        key: "SCHEDULE_WEEK_ANCHOR",
                        value: raw,
                    });
                }
            },
        };

        let offset_minutes: i32 = parse_or(&get, "SCHEDULE_UTC_OFFSET_MINUTES", 0)?;
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::Invalid {
                key: "SCHEDULE_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        let listen_addr: SocketAddr = match get("SCHEDULE_LISTEN_ADDR") {
            None => DEFAULT_LISTEN_ADDR.parse().map_err(|_| SettingsError::Invalid {
                key: "SCHEDULE_LISTEN_ADDR",
                value: DEFAULT_LISTEN_ADDR.to_string(),
            })?,
            Some(raw) => raw.trim().parse().map_err(|_| SettingsError::Invalid {
                key: "SCHEDULE_LISTEN_ADDR",
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            api_base_url: get("SCHEDULE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            credentials: Credentials {
                username: required("SCHEDULE_API_USERNAME")?,
                password: required("SCHEDULE_API_PASSWORD")?,
            },
            schedule: ScheduleConfig {
                role,
                working_hours,
                week_anchor,
                utc_offset,
            },
            listen_addr,
        })
    }

    /// Appointment listing endpoint for the configured role.
    pub fn appointments_path(&self) -> &'static str {
        match self.schedule.role {
            Role::Member => MEMBER_APPOINTMENTS_PATH,
            Role::PersonalTrainer => PT_APPOINTMENTS_PATH,
        }
    }
}

fn parse_role(raw: &str) -> Option<Role> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "member" => Some(Role::Member),
        "pt" | "personal_trainer" | "trainer" => Some(Role::PersonalTrainer),
        _ => None,
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| SettingsError::Invalid { key, value: raw }),
    }
}
