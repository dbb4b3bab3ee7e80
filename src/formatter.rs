//! Turns a raw `OpenMeteo` payload into a [`ForecastRecord`]

use chrono::NaiveDate;

use crate::error::ServiceError;
use crate::models::{DailyForecast, ForecastRecord, RawForecast};

/// Number of days kept in the outlook
pub const OUTLOOK_DAYS: usize = 5;

const DATE_FORMAT: &str = "%A, %B %d";
const FALLBACK_ICON: &str = "01d";

/// Weather condition buckets for WMO weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    ClearSky,
    PartlyCloudy,
    Foggy,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
}

impl WeatherCondition {
    /// Map a WMO code, `None` for codes outside the table
    /// See: https://open-meteo.com/en/docs#weathervariables
    #[must_use]
    pub fn from_wmo_code(code: i32) -> Option<Self> {
        let condition = match code {
            0 => Self::ClearSky,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Foggy,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => return None,
        };
        Some(condition)
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear Sky",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Foggy => "Foggy",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing Drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing Rain",
            Self::Snow => "Snow",
            Self::SnowGrains => "Snow Grains",
            Self::RainShowers => "Rain Showers",
            Self::SnowShowers => "Snow Showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormWithHail => "Thunderstorm with Hail",
        }
    }
}

/// Description for a weather code, "Unknown" when unmapped or missing
#[must_use]
pub fn weather_code_to_description(code: Option<i32>) -> &'static str {
    code.and_then(WeatherCondition::from_wmo_code)
        .map_or("Unknown", |condition| condition.description())
}

/// Icon code for a weather code.
///
/// Icons are finer grained than descriptions: code 3 is still "Partly
/// Cloudy" but gets the overcast icon.
#[must_use]
pub fn weather_code_to_icon(code: Option<i32>) -> &'static str {
    match code {
        Some(0) => "01d",
        Some(1 | 2) => "02d",
        Some(3) => "03d",
        Some(45 | 48) => "50d",
        Some(51 | 53 | 55 | 56 | 57) => "09d",
        Some(61 | 63 | 65 | 66 | 67) => "10d",
        Some(71 | 73 | 75 | 77) => "13d",
        Some(80..=82) => "09d",
        Some(85 | 86) => "13d",
        Some(95 | 96 | 99) => "11d",
        _ => FALLBACK_ICON,
    }
}

fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

// Half away from zero on the decimal value: 1.15 is stored just below 1.15,
// so the scaled round alone would give 1.1.
fn round_tenth(value: f64) -> f64 {
    let mut tenths = (value * 10.0).round();
    if value > 0.0 && (tenths + 0.5) / 10.0 <= value {
        tenths += 1.0;
    } else if value < 0.0 && (tenths - 0.5) / 10.0 >= value {
        tenths -= 1.0;
    }
    tenths / 10.0
}

/// Pure transform from provider payload to forecast record
pub struct ForecastFormatter;

impl ForecastFormatter {
    /// Format a payload for `location_name`.
    ///
    /// Days without a date are skipped, so short series yield fewer than
    /// [`OUTLOOK_DAYS`] entries. A dated day missing its temperatures, or an
    /// empty series, is a [`ServiceError::Format`].
    pub fn format(raw: &RawForecast, location_name: &str) -> crate::Result<ForecastRecord> {
        let current = &raw.current;
        let daily = &raw.daily;

        let today_high = daily_value(&daily.temperature_max, 0, "temperature_2m_max")?;
        let today_low = daily_value(&daily.temperature_min, 0, "temperature_2m_min")?;

        let mut daily_forecast = Vec::with_capacity(OUTLOOK_DAYS);
        for day in 0..OUTLOOK_DAYS {
            let Some(Some(time)) = daily.time.get(day) else {
                continue;
            };

            let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").map_err(|e| {
                ServiceError::format(format!("invalid daily date '{time}': {e}"))
            })?;
            let code = daily.weather_code.get(day).copied().flatten();

            daily_forecast.push(DailyForecast {
                date: date.format(DATE_FORMAT).to_string(),
                high: round_whole(daily_value(&daily.temperature_max, day, "temperature_2m_max")?),
                low: round_whole(daily_value(&daily.temperature_min, day, "temperature_2m_min")?),
                description: weather_code_to_description(code).to_string(),
                icon: weather_code_to_icon(code).to_string(),
            });
        }

        let code = Some(current.weather_code);
        Ok(ForecastRecord {
            location_name: location_name.to_string(),
            current_temp: round_whole(current.temperature),
            feels_like: round_whole(current.feels_like),
            description: weather_code_to_description(code).to_string(),
            humidity: round_whole(current.humidity),
            wind_speed: round_tenth(current.wind_speed),
            icon: weather_code_to_icon(code).to_string(),
            today_high: round_whole(today_high),
            today_low: round_whole(today_low),
            daily_forecast,
            from_cache: false,
            cached_at: String::new(),
        })
    }
}

fn daily_value(series: &[Option<f64>], day: usize, field: &str) -> crate::Result<f64> {
    series
        .get(day)
        .copied()
        .flatten()
        .ok_or_else(|| ServiceError::format(format!("missing {field} for day {day}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentConditions, DailySeries};
    use rstest::rstest;

    fn payload(days: usize) -> RawForecast {
        let dates = [
            "2025-08-01",
            "2025-08-02",
            "2025-08-03",
            "2025-08-04",
            "2025-08-05",
            "2025-08-06",
            "2025-08-07",
        ];
        RawForecast {
            current: CurrentConditions {
                temperature: 75.4,
                feels_like: 76.5,
                humidity: 59.6,
                weather_code: 0,
                wind_speed: 5.26,
            },
            daily: DailySeries {
                time: dates.iter().take(days).map(|d| Some(d.to_string())).collect(),
                temperature_max: (0..days).map(|i| Some(80.4 + i as f64)).collect(),
                temperature_min: (0..days).map(|i| Some(64.6 + i as f64)).collect(),
                weather_code: (0..days).map(|i| Some([0, 1, 61, 95, 999][i % 5])).collect(),
            },
        }
    }

    #[rstest]
    #[case(0, "Clear Sky", "01d")]
    #[case(1, "Partly Cloudy", "02d")]
    #[case(2, "Partly Cloudy", "02d")]
    #[case(3, "Partly Cloudy", "03d")]
    #[case(45, "Foggy", "50d")]
    #[case(48, "Foggy", "50d")]
    #[case(53, "Drizzle", "09d")]
    #[case(57, "Freezing Drizzle", "09d")]
    #[case(63, "Rain", "10d")]
    #[case(66, "Freezing Rain", "10d")]
    #[case(75, "Snow", "13d")]
    #[case(77, "Snow Grains", "13d")]
    #[case(81, "Rain Showers", "09d")]
    #[case(86, "Snow Showers", "13d")]
    #[case(95, "Thunderstorm", "11d")]
    #[case(96, "Thunderstorm with Hail", "11d")]
    #[case(99, "Thunderstorm with Hail", "11d")]
    #[case(999, "Unknown", "01d")]
    #[case(4, "Unknown", "01d")]
    #[case(-1, "Unknown", "01d")]
    fn test_weather_code_table(
        #[case] code: i32,
        #[case] description: &str,
        #[case] icon: &str,
    ) {
        assert_eq!(weather_code_to_description(Some(code)), description);
        assert_eq!(weather_code_to_icon(Some(code)), icon);
    }

    #[test]
    fn test_missing_code_is_unknown() {
        assert_eq!(weather_code_to_description(None), "Unknown");
        assert_eq!(weather_code_to_icon(None), "01d");
    }

    #[test]
    fn test_format_current_values() {
        let record = ForecastFormatter::format(&payload(7), "Vancouver, BC").unwrap();

        assert_eq!(record.location_name, "Vancouver, BC");
        assert_eq!(record.current_temp, 75);
        assert_eq!(record.feels_like, 77);
        assert_eq!(record.humidity, 60);
        assert_eq!(record.wind_speed, 5.3);
        assert_eq!(record.description, "Clear Sky");
        assert_eq!(record.icon, "01d");
        assert_eq!(record.today_high, 80);
        assert_eq!(record.today_low, 65);
        assert!(!record.from_cache);
    }

    #[test]
    fn test_outlook_is_capped_at_five_days() {
        let record = ForecastFormatter::format(&payload(7), "Vancouver, BC").unwrap();

        assert_eq!(record.daily_forecast.len(), OUTLOOK_DAYS);
        let first = &record.daily_forecast[0];
        assert_eq!(first.date, "Friday, August 01");
        assert_eq!(first.high, 80);
        assert_eq!(first.low, 65);
        assert_eq!(record.daily_forecast[3].description, "Thunderstorm");
        assert_eq!(record.daily_forecast[4].description, "Unknown");
        assert_eq!(record.daily_forecast[4].date, "Tuesday, August 05");
    }

    #[test]
    fn test_short_series_yields_fewer_days() {
        let record = ForecastFormatter::format(&payload(2), "Vancouver, BC").unwrap();
        assert_eq!(record.daily_forecast.len(), 2);
        assert_eq!(record.daily_forecast[1].date, "Saturday, August 02");
    }

    #[test]
    fn test_undated_days_are_skipped() {
        let mut raw = payload(4);
        raw.daily.time[1] = None;
        let record = ForecastFormatter::format(&raw, "Somewhere").unwrap();
        assert_eq!(record.daily_forecast.len(), 3);
        assert_eq!(record.daily_forecast[1].date, "Sunday, August 03");
    }

    #[test]
    fn test_empty_series_is_a_format_error() {
        let err = ForecastFormatter::format(&payload(0), "Nowhere").unwrap_err();
        assert!(matches!(err, ServiceError::Format { .. }));
        assert!(err.to_string().contains("temperature_2m_max"));
    }

    #[test]
    fn test_bad_date_is_a_format_error() {
        let mut raw = payload(2);
        raw.daily.time[1] = Some("tomorrow".to_string());
        let err = ForecastFormatter::format(&raw, "Nowhere").unwrap_err();
        assert!(err.to_string().contains("invalid daily date 'tomorrow'"));
    }

    #[test]
    fn test_negative_temperatures_round_half_away_from_zero() {
        let mut raw = payload(1);
        raw.current.temperature = -2.5;
        raw.current.wind_speed = 0.05;
        let record = ForecastFormatter::format(&raw, "Yellowknife").unwrap();
        assert_eq!(record.current_temp, -3);
        assert_eq!(record.wind_speed, 0.1);
    }

    #[test]
    fn test_wind_speed_rounds_binary_edge_up() {
        let mut raw = payload(1);
        raw.current.wind_speed = 1.15;
        let record = ForecastFormatter::format(&raw, "Vancouver").unwrap();
        assert_eq!(record.wind_speed, 1.2);

        assert_eq!(round_tenth(-1.15), -1.2);
        assert_eq!(round_tenth(5.26), 5.3);
        assert_eq!(round_tenth(5.04), 5.0);
        assert_eq!(round_tenth(0.0), 0.0);
    }
}
