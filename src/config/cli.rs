use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::config::time::{parse_timezone, parse_zoned};
use crate::config::toml_config::TomlConfig;
use crate::config::{
    BookingPlan, RunSettings, DEFAULT_BASE_URL, DEFAULT_CALENDAR_UID, DEFAULT_SLEEP_SECONDS,
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_TIMEZONE,
};
use crate::domain::model::{
    BookingJob, CalendarEndpoint, SearchCriterion, ServiceRequest, TimeWindow,
};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "slot-sniper")]
#[command(about = "Get an appointment in a SmartCJM calendar effortlessly")]
pub struct CliConfig {
    /// Base URL of the calendar, for SmartCJM calendars other than Aachen Bürgerservice
    #[arg(short = 'b', long, global = true)]
    pub base_url: Option<String>,

    /// UID of the calendar
    #[arg(short = 'c', long, global = true)]
    pub calendar_uid: Option<String>,

    /// Run as usual, but don't register any appointment
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Don't ask for confirmation, always assume 'yes'
    #[arg(short = 'y', long, global = true)]
    pub no_confirm: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Optional TOML file with calendar, booking and http settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List available appointment types and their UID
    List,
    /// Book an appointment given the parameters
    Book(BookArgs),
}

#[derive(Debug, Clone, Args)]
pub struct BookArgs {
    /// UID of the appointment type to snipe (see `list`)
    #[arg(short = 'u', long)]
    pub uid: Option<String>,

    /// Mail address used for booking the appointment
    #[arg(short = 'm', long)]
    pub mail: Option<String>,

    /// Case-insensitive substring of the wanted location
    #[arg(short = 'l', long)]
    pub location: Option<String>,

    /// Earliest acceptable start, ISO 8601 (e.g. 2025-03-01T09:00:00+01:00)
    #[arg(long)]
    pub time_from: Option<String>,

    /// Latest acceptable start, ISO 8601
    #[arg(long)]
    pub time_to: Option<String>,

    /// Seconds to wait between attempts
    #[arg(short = 's', long)]
    pub sleep: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl CliConfig {
    pub fn load_file_config(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)
            }
            None => Ok(TomlConfig::default()),
        }
    }

    /// 命令列優先，其次設定檔，最後是內建預設值
    pub fn run_settings(&self, file: &TomlConfig) -> RunSettings {
        let base_url = self
            .base_url
            .as_deref()
            .or(file.base_url().map(String::as_str))
            .unwrap_or(DEFAULT_BASE_URL);
        let calendar_uid = self
            .calendar_uid
            .as_deref()
            .or(file.calendar_uid().map(String::as_str))
            .unwrap_or(DEFAULT_CALENDAR_UID);
        let timeout = self
            .timeout
            .or(file.timeout_seconds())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        RunSettings {
            endpoint: CalendarEndpoint::new(base_url, calendar_uid),
            request_timeout: Duration::from_secs(timeout),
            user_agent: file
                .user_agent()
                .cloned()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            dry_run: self.dry_run,
            no_confirm: self.no_confirm,
        }
    }
}

impl BookArgs {
    pub fn booking_plan(&self, file: &TomlConfig) -> Result<BookingPlan> {
        let section = file.booking();
        let pick = |cli: &Option<String>, from_file: &Option<String>, field: &str| {
            validate_required_field(field, cli.as_ref().or(from_file.as_ref())).cloned()
        };

        let uid = pick(&self.uid, &section.service_uid, "uid")?;
        let mail = pick(&self.mail, &section.mail, "mail")?;
        let location = pick(&self.location, &section.location, "location")?;
        let time_from = pick(&self.time_from, &section.time_from, "time_from")?;
        let time_to = pick(&self.time_to, &section.time_to, "time_to")?;

        let timezone = parse_timezone(
            file.default_timezone()
                .map(String::as_str)
                .unwrap_or(DEFAULT_TIMEZONE),
        )?;
        let window = TimeWindow::new(
            parse_zoned("time_from", &time_from, timezone)?,
            parse_zoned("time_to", &time_to, timezone)?,
        );

        let sleep = self
            .sleep
            .or(section.sleep_seconds)
            .unwrap_or(DEFAULT_SLEEP_SECONDS);

        Ok(BookingPlan {
            job: BookingJob {
                service: ServiceRequest::new(uid.trim()),
                criterion: SearchCriterion::new(location, window),
                contact_address: mail.trim().to_string(),
            },
            interval: Duration::from_secs(sleep),
        })
    }
}
