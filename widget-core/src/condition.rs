//! Provider condition codes reduced to the small set the widget renders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    Clear,
    Cloudy,
    /// Rain, drizzle and thunderstorms.
    Rainy,
    Snowy,
    Misty,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    /// Night is any local hour outside 06:00–18:00.
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) { TimeOfDay::Day } else { TimeOfDay::Night }
    }
}

impl ConditionCategory {
    /// Schema A `weather[0].main`.
    pub fn from_openweather_main(main: &str) -> Self {
        match main {
            "Clear" => ConditionCategory::Clear,
            "Clouds" => ConditionCategory::Cloudy,
            "Rain" | "Drizzle" | "Thunderstorm" | "Squall" => ConditionCategory::Rainy,
            "Snow" => ConditionCategory::Snowy,
            "Mist" | "Fog" | "Haze" | "Smoke" | "Dust" | "Sand" | "Ash" => ConditionCategory::Misty,
            _ => ConditionCategory::Unknown,
        }
    }

    /// Schema B condition code, falling back to the English condition text
    /// when the code is absent or not one we know.
    pub fn from_weatherapi(code: Option<u32>, text: &str) -> Self {
        code.and_then(Self::from_weatherapi_code).unwrap_or_else(|| Self::from_text(text))
    }

    fn from_weatherapi_code(code: u32) -> Option<Self> {
        let category = match code {
            1000 => ConditionCategory::Clear,
            1003 | 1006 | 1009 => ConditionCategory::Cloudy,
            1030 | 1135 | 1147 => ConditionCategory::Misty,
            1066 | 1069 | 1072 | 1114 | 1117 | 1204..=1237 | 1249..=1264 => {
                ConditionCategory::Snowy
            }
            1063 | 1087 | 1150..=1201 | 1240..=1246 | 1273..=1282 => ConditionCategory::Rainy,
            _ => return None,
        };
        Some(category)
    }

    fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if has(&["thunder", "rain", "drizzle", "shower"]) {
            ConditionCategory::Rainy
        } else if has(&["snow", "sleet", "blizzard", "ice"]) {
            ConditionCategory::Snowy
        } else if has(&["mist", "fog", "haze"]) {
            ConditionCategory::Misty
        } else if has(&["cloud", "overcast"]) {
            ConditionCategory::Cloudy
        } else if has(&["sun", "clear"]) {
            ConditionCategory::Clear
        } else {
            ConditionCategory::Unknown
        }
    }

    pub fn glyph(self, time_of_day: TimeOfDay) -> &'static str {
        match (self, time_of_day) {
            (ConditionCategory::Clear, TimeOfDay::Day) => "☀️",
            (ConditionCategory::Clear, TimeOfDay::Night) => "🌙",
            (ConditionCategory::Cloudy, _) => "☁️",
            (ConditionCategory::Rainy, _) => "🌧️",
            (ConditionCategory::Snowy, _) => "❄️",
            (ConditionCategory::Misty, _) => "🌫️",
            (ConditionCategory::Unknown, _) => "🌤️",
        }
    }
}

/// Background theme key used by the rich rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundTheme {
    ClearDay,
    ClearNight,
    Cloudy,
    Rainy,
    Snowy,
    Misty,
    Default,
}

impl BackgroundTheme {
    pub fn select(category: ConditionCategory, time_of_day: TimeOfDay) -> Self {
        match (category, time_of_day) {
            (ConditionCategory::Clear, TimeOfDay::Day) => BackgroundTheme::ClearDay,
            (ConditionCategory::Clear, TimeOfDay::Night) => BackgroundTheme::ClearNight,
            (ConditionCategory::Cloudy, _) => BackgroundTheme::Cloudy,
            (ConditionCategory::Rainy, _) => BackgroundTheme::Rainy,
            (ConditionCategory::Snowy, _) => BackgroundTheme::Snowy,
            (ConditionCategory::Misty, _) => BackgroundTheme::Misty,
            (ConditionCategory::Unknown, _) => BackgroundTheme::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundTheme::ClearDay => "clear-day",
            BackgroundTheme::ClearNight => "clear-night",
            BackgroundTheme::Cloudy => "cloudy",
            BackgroundTheme::Rainy => "rainy",
            BackgroundTheme::Snowy => "snowy",
            BackgroundTheme::Misty => "misty",
            BackgroundTheme::Default => "default",
        }
    }
}
