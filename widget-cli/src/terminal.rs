use widget_core::{CurrentView, ForecastDayView, WeatherView, WidgetError};

/// Renders the widget as plain lines on stdout.
#[derive(Debug, Default)]
pub struct TerminalView {
    show_theme: bool,
}

impl TerminalView {
    pub fn new(show_theme: bool) -> Self {
        Self { show_theme }
    }
}

impl WeatherView for TerminalView {
    fn show_loading(&mut self) {
        println!("Loading weather data...");
    }

    fn show_error(&mut self, _error: &WidgetError, message: &str) {
        eprintln!("❗ {message}");
    }

    fn render_current(&mut self, current: &CurrentView) {
        println!();
        println!("{}", current.location);
        println!("{}", current.observed_at);
        println!(
            "{}  {}{}  {}",
            current.icon, current.temperature, current.temperature_unit, current.description
        );
        println!("  Feels like: {}", current.feels_like);
        println!("  Humidity:   {}", current.humidity);
        println!("  Wind:       {}", current.wind);
        println!("  Pressure:   {}", current.pressure);
        if self.show_theme
            && let Some(theme) = current.theme
        {
            println!("  Theme:      {}", theme.as_str());
        }
    }

    fn render_forecast(&mut self, days: &[ForecastDayView]) {
        if days.is_empty() {
            return;
        }
        println!();
        println!("{}-day forecast", days.len());
        for day in days {
            println!("  {}  {}  {} / {}  {}", day.label, day.icon, day.min, day.max, day.description);
        }
    }
}
