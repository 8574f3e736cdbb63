use crate::domain::model::TimeWindow;
use crate::utils::error::{Result, SniperError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SniperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SniperError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SniperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SniperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: Option<&'a T>) -> Result<&'a T> {
    value.ok_or_else(|| SniperError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SniperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 只做基本檢查，真正的驗證交給日曆服務寄出的確認信
pub fn validate_mail_address(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid || value.chars().any(char::is_whitespace) {
        return Err(SniperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Not a mail address".to_string(),
        });
    }
    Ok(())
}

pub fn validate_time_window(field_name: &str, window: &TimeWindow) -> Result<()> {
    if window.lower > window.upper {
        return Err(SniperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: window.lower.to_rfc3339(),
            reason: format!("Must not be later than time_to ({})", window.upper.to_rfc3339()),
        });
    }
    Ok(())
}
