use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure categories a search can end in.
///
/// Each category carries one fixed user-facing message (see
/// [`WidgetError::user_message`]); the `Display` form is for logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("no usable API key configured")]
    ConfigurationMissing,

    #[error("search input is empty")]
    Validation,

    #[error("provider does not know this location")]
    NotFound,

    #[error("provider rejected the API key")]
    Unauthorized,

    #[error("request exceeded the configured deadline")]
    Timeout,

    #[error("request failed: {0}")]
    Network(String),

    #[error("provider '{0}' has no forecast endpoint")]
    ForecastUnsupported(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ConfigurationMissing,
    Validation,
    NotFound,
    Unauthorized,
    Timeout,
    NetworkOrServerError,
}

impl WidgetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WidgetError::ConfigurationMissing => ErrorCategory::ConfigurationMissing,
            WidgetError::Validation => ErrorCategory::Validation,
            WidgetError::NotFound => ErrorCategory::NotFound,
            WidgetError::Unauthorized => ErrorCategory::Unauthorized,
            WidgetError::Timeout => ErrorCategory::Timeout,
            WidgetError::Network(_) | WidgetError::ForecastUnsupported(_) => {
                ErrorCategory::NetworkOrServerError
            }
        }
    }

    /// Short message shown to the user, Korean for `ko`, English otherwise.
    pub fn user_message(&self, language: &str) -> &'static str {
        self.category().message(language)
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WidgetError::Timeout
        } else {
            WidgetError::Network(err.to_string())
        }
    }
}

impl ErrorCategory {
    pub fn message(self, language: &str) -> &'static str {
        let korean = language.eq_ignore_ascii_case("ko");
        match (self, korean) {
            (ErrorCategory::ConfigurationMissing, false) => {
                "API key is not configured. Set WEATHER_API_KEY and reload."
            }
            (ErrorCategory::ConfigurationMissing, true) => {
                "API 키가 설정되지 않았습니다. WEATHER_API_KEY 값을 설정해주세요."
            }
            (ErrorCategory::Validation, false) => "Please enter a city name.",
            (ErrorCategory::Validation, true) => "도시 이름을 입력해주세요.",
            (ErrorCategory::NotFound, false) => "City not found. Check the spelling and try again.",
            (ErrorCategory::NotFound, true) => "도시를 찾을 수 없습니다. 도시 이름을 확인해주세요.",
            (ErrorCategory::Unauthorized, false) => "The API key was rejected by the provider.",
            (ErrorCategory::Unauthorized, true) => "API 키가 유효하지 않습니다.",
            (ErrorCategory::Timeout, false) => "The request timed out. Please try again.",
            (ErrorCategory::Timeout, true) => "요청 시간이 초과되었습니다. 다시 시도해주세요.",
            (ErrorCategory::NetworkOrServerError, false) => {
                "Could not load weather data. Please try again."
            }
            (ErrorCategory::NetworkOrServerError, true) => {
                "날씨 정보를 불러올 수 없습니다. 다시 시도해주세요."
            }
        }
    }
}

/// Errors raised while reading the `KEY=VALUE` settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
