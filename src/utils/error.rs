use thiserror::Error;

#[derive(Error, Debug)]
pub enum SniperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network interruption: {message}")]
    Transient { message: String },

    #[error("Unexpected response from calendar service: {message}")]
    Protocol { message: String },

    #[error("Malformed appointment payload: {message}")]
    Parse { message: String },

    #[error("Booking failed: {reason}")]
    BookingFailure { reason: String },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SniperError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Protocol,
    Data,
    Booking,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SniperError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// 可在下一輪輪詢重試的錯誤（逾時、連線中斷）。
    /// 其餘錯誤代表服務端契約改變或本地設定錯誤，必須中止整個執行。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transient { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::Transient { .. } => ErrorCategory::Network,
            Self::Protocol { .. } => ErrorCategory::Protocol,
            Self::Parse { .. } | Self::SerializationError(_) => ErrorCategory::Data,
            Self::BookingFailure { .. } => ErrorCategory::Booking,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if self.is_recoverable() {
            return ErrorSeverity::Medium;
        }
        match self.category() {
            ErrorCategory::Network
            | ErrorCategory::Protocol
            | ErrorCategory::Data
            | ErrorCategory::Booking
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection; the next attempt will retry",
            ErrorCategory::Protocol => {
                "The calendar service changed its pages; check --base-url and --calendar-uid"
            }
            ErrorCategory::Data => "The appointment list could not be read; try again later",
            ErrorCategory::Booking => {
                "Check your mailbox before retrying, the booking may have been registered"
            }
            ErrorCategory::Configuration => "Fix the command line arguments or the config file",
            ErrorCategory::System => "Check file permissions and available resources",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Http(_) | Self::Transient { .. } => {
                "Could not reach the calendar service".to_string()
            }
            Self::Protocol { message } => format!("Calendar service responded unexpectedly: {}", message),
            Self::Parse { message } => format!("Could not read the offered appointments: {}", message),
            Self::BookingFailure { reason } => format!("Booking failed: {}", reason),
            Self::MissingConfigError { field } => format!("Missing required setting '{}'", field),
            other => other.to_string(),
        }
    }
}
