use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 日曆服務的位置：基礎網址加上日曆 UID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEndpoint {
    pub base_url: String,
    pub calendar_uid: String,
}

impl CalendarEndpoint {
    pub fn new(base_url: impl Into<String>, calendar_uid: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            calendar_uid: calendar_uid.into(),
        }
    }

    pub fn landing_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_result_url(&self) -> String {
        format!("{}/search_result", self.base_url)
    }

    pub fn booking_url(&self) -> String {
        format!("{}/booking", self.base_url)
    }

    pub fn service_list_url(&self) -> String {
        format!("{}/get_service_list", self.base_url)
    }
}

/// 防偽 token：欄位名稱與值必須原樣送回
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntiForgeryToken {
    pub name: String,
    pub value: String,
}

/// 單輪輪詢的 session 狀態，不可跨輪重用
#[derive(Debug, PartialEq, Eq)]
pub struct SessionContext {
    session_id: String,
    token: AntiForgeryToken,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, token: AntiForgeryToken) -> Self {
        Self {
            session_id: session_id.into(),
            token,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn token(&self) -> &AntiForgeryToken {
        &self.token
    }

    /// Replaces the token, keeping the session id. Consumes the old context.
    pub fn with_token(self, token: AntiForgeryToken) -> Self {
        Self {
            session_id: self.session_id,
            token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub service_uid: String,
    pub quantity: u32,
}

impl ServiceRequest {
    pub fn new(service_uid: impl Into<String>) -> Self {
        Self {
            service_uid: service_uid.into(),
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    pub location_name: String,
    pub location_uid: String,
    pub start_time: DateTime<FixedOffset>,
}

impl Appointment {
    /// 預約時送回服務端的時間格式，例如 `2025-03-01T10:00:00+01:00`
    pub fn start_time_param(&self) -> String {
        self.start_time.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.start_time, self.location_name)
    }
}

/// Raw entry as embedded in the search result page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAppointment {
    pub unit: String,
    pub unit_uid: String,
    pub datetime_iso86001: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Offered(Vec<Appointment>),
    NoneOffered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub lower: DateTime<FixedOffset>,
    pub upper: DateTime<FixedOffset>,
}

impl TimeWindow {
    pub fn new(lower: DateTime<FixedOffset>, upper: DateTime<FixedOffset>) -> Self {
        Self { lower, upper }
    }

    /// 上下界皆包含
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        self.lower <= *instant && *instant <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    LocationMismatch,
    TimeMismatch,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::LocationMismatch => write!(f, "unwanted location"),
            Rejection::TimeMismatch => write!(f, "timeframe mismatch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriterion {
    location_substring: String,
    pub time_window: TimeWindow,
}

impl SearchCriterion {
    pub fn new(location_substring: impl Into<String>, time_window: TimeWindow) -> Self {
        Self {
            location_substring: location_substring.into(),
            time_window,
        }
    }

    pub fn location_substring(&self) -> &str {
        &self.location_substring
    }

    /// `None` 表示符合條件；地點先於時間檢查
    pub fn check(&self, appointment: &Appointment) -> Option<Rejection> {
        if !appointment
            .location_name
            .to_lowercase()
            .contains(&self.location_substring.to_lowercase())
        {
            return Some(Rejection::LocationMismatch);
        }
        if !self.time_window.contains(&appointment.start_time) {
            return Some(Rejection::TimeMismatch);
        }
        None
    }
}

/// Everything a `book` run needs, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingJob {
    pub service: ServiceRequest,
    pub criterion: SearchCriterion,
    pub contact_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Appointment),
    /// The run ended (stopped by the caller) without any matching slot.
    NoMatch,
    Failed(String),
    /// A slot matched but booking was skipped on request.
    DryRun(Appointment),
}

impl BookingOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, BookingOutcome::Failed(_))
    }
}

/// 服務類型清單（`list` 子命令）
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceListResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<ServiceType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceType {
    pub uid: String,
    pub service_name: String,
    #[serde(default)]
    pub categories: Vec<ServiceCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCategory {
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let endpoint = CalendarEndpoint::new("https://example.com/m/calendar/", "cal-1");
        assert_eq!(endpoint.landing_url(), "https://example.com/m/calendar");
        assert_eq!(
            endpoint.search_result_url(),
            "https://example.com/m/calendar/search_result"
        );
        assert_eq!(endpoint.booking_url(), "https://example.com/m/calendar/booking");
        assert_eq!(
            endpoint.service_list_url(),
            "https://example.com/m/calendar/get_service_list"
        );
    }

    #[test]
    fn test_time_window_is_inclusive() {
        let window = TimeWindow::new(at("2025-03-01T09:00:00+01:00"), at("2025-03-01T17:00:00+01:00"));
        assert!(window.contains(&at("2025-03-01T09:00:00+01:00")));
        assert!(window.contains(&at("2025-03-01T17:00:00+01:00")));
        assert!(window.contains(&at("2025-03-01T16:00:00Z")));
        assert!(!window.contains(&at("2025-03-01T08:59:59+01:00")));
        assert!(!window.contains(&at("2025-03-01T17:00:01+01:00")));
    }

    #[test]
    fn test_criterion_check_reports_reason() {
        let window = TimeWindow::new(at("2025-03-01T09:00:00+01:00"), at("2025-03-01T17:00:00+01:00"));
        let criterion = SearchCriterion::new("RATHAUS", window);
        let appointment = |name: &str, ts: &str| Appointment {
            location_name: name.to_string(),
            location_uid: "U".to_string(),
            start_time: at(ts),
        };

        assert_eq!(criterion.check(&appointment("Bürgerservice Rathaus", "2025-03-01T10:00:00+01:00")), None);
        assert_eq!(
            criterion.check(&appointment("Nordbad", "2025-03-01T10:00:00+01:00")),
            Some(Rejection::LocationMismatch)
        );
        assert_eq!(
            criterion.check(&appointment("Rathaus", "2025-03-02T10:00:00+01:00")),
            Some(Rejection::TimeMismatch)
        );
    }

    #[test]
    fn test_start_time_param_keeps_offset() {
        let appointment = Appointment {
            location_name: "Rathaus".to_string(),
            location_uid: "U1".to_string(),
            start_time: at("2025-03-01T10:00:00+01:00"),
        };
        assert_eq!(appointment.start_time_param(), "2025-03-01T10:00:00+01:00");
    }

    #[test]
    fn test_session_token_replacement_keeps_session_id() {
        let session = SessionContext::new(
            "W1",
            AntiForgeryToken {
                name: "__RequestVerificationToken".to_string(),
                value: "a".to_string(),
            },
        );
        let refreshed = session.with_token(AntiForgeryToken {
            name: "__RequestVerificationToken".to_string(),
            value: "b".to_string(),
        });
        assert_eq!(refreshed.session_id(), "W1");
        assert_eq!(refreshed.token().value, "b");
    }
}
