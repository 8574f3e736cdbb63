use crate::utils::error::{Result, SniperError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 設定檔：所有欄位皆為選填，命令列參數優先
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub calendar: Option<CalendarSection>,
    pub booking: Option<BookingSection>,
    pub http: Option<HttpSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarSection {
    pub base_url: Option<String>,
    pub calendar_uid: Option<String>,
    pub default_timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingSection {
    pub service_uid: Option<String>,
    pub mail: Option<String>,
    pub location: Option<String>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub sleep_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SniperError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SniperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SNIPER_MAIL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SniperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn base_url(&self) -> Option<&String> {
        self.calendar.as_ref()?.base_url.as_ref()
    }

    pub fn calendar_uid(&self) -> Option<&String> {
        self.calendar.as_ref()?.calendar_uid.as_ref()
    }

    pub fn default_timezone(&self) -> Option<&String> {
        self.calendar.as_ref()?.default_timezone.as_ref()
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.http.as_ref()?.timeout_seconds
    }

    pub fn user_agent(&self) -> Option<&String> {
        self.http.as_ref()?.user_agent.as_ref()
    }

    pub fn booking(&self) -> BookingSection {
        self.booking.clone().unwrap_or_default()
    }
}
