//! Sky condition classification
//!
//! Maps a single reading to a human-readable label built from three
//! independent bands: temperature, humidity and pressure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature band in Celsius. Each band is lower-inclusive and upper-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureBand {
    /// Below 5°C
    Freezing,
    /// 5°C to 10°C
    Chilly,
    /// 10°C to 18°C
    Cool,
    /// 18°C to 25°C
    Mild,
    /// 25°C to 32°C
    Warm,
    /// 32°C to 40°C
    Hot,
    /// 40°C and above
    Scorching,
}

/// Humidity band in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HumidityBand {
    /// Above 90%
    Rainy,
    /// Above 60%
    Humid,
    /// Below 40%
    Dry,
    /// 40% to 60%
    Comfortable,
}

/// Pressure band in hPa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureBand {
    /// Below 990 hPa
    ProbableStorm,
    /// 990 to 1000 hPa
    StrongWind,
    /// Above 1000 up to 1020 hPa
    LightBreeze,
    /// Above 1020 hPa
    CalmWind,
}

impl TemperatureBand {
    #[must_use]
    pub fn from_celsius(temperature: f64) -> Self {
        if temperature < 5.0 {
            Self::Freezing
        } else if temperature < 10.0 {
            Self::Chilly
        } else if temperature < 18.0 {
            Self::Cool
        } else if temperature < 25.0 {
            Self::Mild
        } else if temperature < 32.0 {
            Self::Warm
        } else if temperature < 40.0 {
            Self::Hot
        } else {
            Self::Scorching
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Freezing => "Freezing",
            Self::Chilly => "Chilly",
            Self::Cool => "Cool",
            Self::Mild => "Mild",
            Self::Warm => "Warm",
            Self::Hot => "Hot",
            Self::Scorching => "Scorching",
        }
    }
}

impl HumidityBand {
    /// `Rainy` takes precedence over `Humid`.
    #[must_use]
    pub fn from_percent(humidity: f64) -> Self {
        if humidity > 90.0 {
            Self::Rainy
        } else if humidity > 60.0 {
            Self::Humid
        } else if humidity < 40.0 {
            Self::Dry
        } else {
            Self::Comfortable
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rainy => "Rainy",
            Self::Humid => "Humid",
            Self::Dry => "Dry",
            Self::Comfortable => "Comfortable",
        }
    }
}

impl PressureBand {
    #[must_use]
    pub fn from_hpa(pressure: f64) -> Self {
        if pressure < 990.0 {
            Self::ProbableStorm
        } else if pressure <= 1000.0 {
            Self::StrongWind
        } else if pressure <= 1020.0 {
            Self::LightBreeze
        } else {
            Self::CalmWind
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ProbableStorm => "Probable storm",
            Self::StrongWind => "Strong wind",
            Self::LightBreeze => "Light breeze",
            Self::CalmWind => "Calm wind",
        }
    }
}

/// The three bands a reading falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyCondition {
    pub temperature: TemperatureBand,
    pub humidity: HumidityBand,
    pub pressure: PressureBand,
}

impl SkyCondition {
    #[must_use]
    pub fn from_values(temperature: f64, humidity: f64, pressure: f64) -> Self {
        Self {
            temperature: TemperatureBand::from_celsius(temperature),
            humidity: HumidityBand::from_percent(humidity),
            pressure: PressureBand::from_hpa(pressure),
        }
    }
}

impl fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.temperature.label(),
            self.humidity.label(),
            self.pressure.label()
        )
    }
}

/// Classify a reading into its sky condition label,
/// e.g. `"Warm, Rainy, Probable storm"`.
#[must_use]
pub fn classify(temperature: f64, humidity: f64, pressure: f64) -> String {
    SkyCondition::from_values(temperature, humidity, pressure).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_classify_known_readings() {
        assert_eq!(classify(4.0, 50.0, 1010.0), "Freezing, Comfortable, Light breeze");
        assert_eq!(classify(30.0, 95.0, 985.0), "Warm, Rainy, Probable storm");
    }

    #[rstest]
    #[case(-10.0, TemperatureBand::Freezing)]
    #[case(4.99, TemperatureBand::Freezing)]
    #[case(5.0, TemperatureBand::Chilly)]
    #[case(10.0, TemperatureBand::Cool)]
    #[case(18.0, TemperatureBand::Mild)]
    #[case(25.0, TemperatureBand::Warm)]
    #[case(32.0, TemperatureBand::Hot)]
    #[case(39.99, TemperatureBand::Hot)]
    #[case(40.0, TemperatureBand::Scorching)]
    fn test_temperature_bands(#[case] celsius: f64, #[case] expected: TemperatureBand) {
        assert_eq!(TemperatureBand::from_celsius(celsius), expected);
    }

    #[rstest]
    #[case(95.0, HumidityBand::Rainy)]
    #[case(90.0, HumidityBand::Humid)]
    #[case(60.5, HumidityBand::Humid)]
    #[case(60.0, HumidityBand::Comfortable)]
    #[case(40.0, HumidityBand::Comfortable)]
    #[case(39.9, HumidityBand::Dry)]
    fn test_humidity_bands(#[case] percent: f64, #[case] expected: HumidityBand) {
        assert_eq!(HumidityBand::from_percent(percent), expected);
    }

    #[rstest]
    #[case(989.9, PressureBand::ProbableStorm)]
    #[case(990.0, PressureBand::StrongWind)]
    #[case(1000.0, PressureBand::StrongWind)]
    #[case(1000.1, PressureBand::LightBreeze)]
    #[case(1020.0, PressureBand::LightBreeze)]
    #[case(1020.1, PressureBand::CalmWind)]
    fn test_pressure_bands(#[case] hpa: f64, #[case] expected: PressureBand) {
        assert_eq!(PressureBand::from_hpa(hpa), expected);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let first = classify(41.0, 12.0, 1030.0);
        assert_eq!(first, "Scorching, Dry, Calm wind");
        assert_eq!(first, classify(41.0, 12.0, 1030.0));
    }
}
