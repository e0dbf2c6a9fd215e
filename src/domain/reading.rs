// Water quality reading domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the three monitored water parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Parameter {
    Ph,
    Tds,
    Temperature,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [Parameter::Ph, Parameter::Tds, Parameter::Temperature];

    /// Field name as it appears on the wire and in CSV headers.
    /// These names are part of the source contract and must not be renamed.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Tds => "TDS",
            Parameter::Temperature => "Temperature",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Parameter> {
        match name {
            "pH" => Some(Parameter::Ph),
            "TDS" => Some(Parameter::Tds),
            "Temperature" => Some(Parameter::Temperature),
            _ => None,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Ph => "",
            Parameter::Tds => "ppm",
            Parameter::Temperature => "°C",
        }
    }
}

/// Coarse overall label attached to every stored reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Good,
    Fair,
    Poor,
}

impl Condition {
    /// Classify a full reading with the wide bands. This is the label stored
    /// on readings and synthetic history points; the finer per-parameter
    /// tiers live in `thresholds` and use narrower bands.
    pub fn from_values(ph: f64, tds: f64, temperature: f64) -> Condition {
        if ph < 6.0 || ph > 9.0 || tds > 600.0 || temperature < 5.0 || temperature > 30.0 {
            Condition::Poor
        } else if ph < 6.5 || ph > 8.5 || tds > 300.0 || temperature < 10.0 || temperature > 25.0 {
            Condition::Fair
        } else {
            Condition::Good
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

/// Raw payload as pushed by the realtime store (wire format, verbatim field
/// names).
#[derive(Debug, Clone, Deserialize)]
pub struct RawReading {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "TDS")]
    pub tds: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}

impl RawReading {
    /// Normalize into the canonical shape, stamping the capture time at
    /// ingestion. The sensor does not supply timestamps.
    pub fn into_reading(self, captured_at: DateTime<Utc>) -> Reading {
        Reading::new(self.ph, self.tds, self.temperature, captured_at)
    }
}

/// Canonical sensor snapshot. `condition` is derived from the three values
/// at construction and is never settable independently.
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "TDS")]
    pub tds: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Condition")]
    pub condition: Condition,
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(ph: f64, tds: f64, temperature: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            ph,
            tds,
            temperature,
            condition: Condition::from_values(ph, tds, temperature),
            captured_at,
        }
    }

    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Tds => self.tds,
            Parameter::Temperature => self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_bands() {
        assert_eq!(Condition::from_values(7.0, 150.0, 20.0), Condition::Good);
        // Fair band triggers on any single parameter
        assert_eq!(Condition::from_values(6.2, 150.0, 20.0), Condition::Fair);
        assert_eq!(Condition::from_values(7.0, 450.0, 20.0), Condition::Fair);
        assert_eq!(Condition::from_values(7.0, 150.0, 27.0), Condition::Fair);
        // Poor band overrides Fair
        assert_eq!(Condition::from_values(5.5, 150.0, 20.0), Condition::Poor);
        assert_eq!(Condition::from_values(7.0, 700.0, 20.0), Condition::Poor);
        assert_eq!(Condition::from_values(7.0, 150.0, 3.0), Condition::Poor);
        assert_eq!(Condition::from_values(9.5, 200.0, 18.0), Condition::Poor);
    }

    #[test]
    fn test_condition_derived_on_construction() {
        let reading = Reading::new(9.5, 200.0, 18.0, Utc::now());
        assert_eq!(reading.condition, Condition::Poor);
        assert_eq!(
            reading.condition,
            Condition::from_values(reading.ph, reading.tds, reading.temperature)
        );
    }

    #[test]
    fn test_parameter_wire_names_round_trip() {
        for parameter in Parameter::ALL {
            assert_eq!(
                Parameter::from_wire_name(parameter.wire_name()),
                Some(parameter)
            );
        }
        assert_eq!(Parameter::from_wire_name("Turbidity"), None);
    }
}
