use crate::error::{DreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_FORECAST_MONTHS: u32 = 120;

/// Tenant-level knobs for the statement pipeline, usually loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DreSettings {
    /// Months projected by [`crate::service::DreService::forecast`] when the caller gives none.
    pub forecast_months: u32,
    /// Sector key used to pick the valuation multiple.
    pub sector: Option<String>,
    pub divida_bruta: f64,
    pub caixa: f64,
    /// Allowed drift when verifying a built statement.
    pub verification_tolerance: f64,
    /// Classifier matches below this confidence are left unclassified on import.
    pub min_import_confidence: f64,
}

impl Default for DreSettings {
    fn default() -> Self {
        Self {
            forecast_months: 6,
            sector: None,
            divida_bruta: 0.0,
            caixa: 0.0,
            verification_tolerance: 0.01,
            min_import_confidence: 0.0,
        }
    }
}

impl DreSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FORECAST_MONTHS).contains(&self.forecast_months) {
            return Err(DreError::InvalidSettings(format!(
                "forecast_months must be between 1 and {}, got {}",
                MAX_FORECAST_MONTHS, self.forecast_months
            )));
        }

        if !(self.verification_tolerance >= 0.0) {
            return Err(DreError::InvalidSettings(format!(
                "verification_tolerance must be non-negative, got {}",
                self.verification_tolerance
            )));
        }

        if !(0.0..=1.0).contains(&self.min_import_confidence) {
            return Err(DreError::InvalidSettings(format!(
                "min_import_confidence must be between 0.0 and 1.0, got {}",
                self.min_import_confidence
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DreSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            DreSettings::from_json_str(r#"{ "sector": "saas", "caixa": 50000.0 }"#).unwrap();
        assert_eq!(settings.sector.as_deref(), Some("saas"));
        assert_eq!(settings.caixa, 50_000.0);
        assert_eq!(settings.forecast_months, 6);
        assert_eq!(settings.verification_tolerance, 0.01);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for json in [
            r#"{ "forecast_months": 0 }"#,
            r#"{ "forecast_months": 500 }"#,
            r#"{ "verification_tolerance": -1.0 }"#,
            r#"{ "min_import_confidence": 1.5 }"#,
        ] {
            let result = DreSettings::from_json_str(json);
            assert!(
                matches!(result, Err(DreError::InvalidSettings(_))),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = DreSettings::from_json_str("{ not json");
        assert!(matches!(result, Err(DreError::Serialization(_))));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("dre-settings-{}.json", uuid::Uuid::new_v4()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            write!(file, r#"{{ "forecast_months": 12, "divida_bruta": 1000.0 }}"#).unwrap();
        }

        let settings = DreSettings::from_json_file(&path).unwrap();
        assert_eq!(settings.forecast_months, 12);
        assert_eq!(settings.divida_bruta, 1_000.0);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            DreSettings::from_json_file(&path),
            Err(DreError::Io(_))
        ));
    }
}
