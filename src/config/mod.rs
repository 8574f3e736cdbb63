#[cfg(feature = "cli")]
pub mod cli;
pub mod time;
pub mod toml_config;

use crate::domain::model::{BookingJob, CalendarEndpoint};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_mail_address, validate_non_empty_string, validate_positive_number,
    validate_time_window, validate_url, Validate,
};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://stadt-aachen.saas.smartcjm.com/m/buergerservice/extern/calendar";
pub const DEFAULT_CALENDAR_UID: &str = "15940648-b483-46d9-819e-285707f1fc34";
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";
pub const DEFAULT_SLEEP_SECONDS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 所有子命令共用的設定
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub endpoint: CalendarEndpoint,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub dry_run: bool,
    pub no_confirm: bool,
}

/// `book` 子命令解析後的工作內容
#[derive(Debug, Clone)]
pub struct BookingPlan {
    pub job: BookingJob,
    pub interval: Duration,
}

impl Validate for RunSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.endpoint.base_url)?;
        validate_non_empty_string("calendar_uid", &self.endpoint.calendar_uid)?;
        validate_positive_number("timeout", self.request_timeout.as_secs(), 1)?;
        Ok(())
    }
}

impl Validate for BookingPlan {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("uid", &self.job.service.service_uid)?;
        validate_mail_address("mail", &self.job.contact_address)?;
        validate_non_empty_string("location", self.job.criterion.location_substring())?;
        validate_time_window("time_from", &self.job.criterion.time_window)?;
        validate_positive_number("sleep", self.interval.as_secs(), 1)?;
        Ok(())
    }
}
