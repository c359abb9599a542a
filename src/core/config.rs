//! SZ-002: Config store — a keyed bag of heterogeneous scalar constants.
//!
//! Callers load the store once at construction (plus the single `set`
//! extension point); recipes query it by name and type during
//! construction or execution. The store is read-only while planning and
//! executing.

use std::collections::HashMap;

use super::error::SazonError;

/// A typed scalar constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Double(f64),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    /// Human-readable tag used in type-mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Double(_) => "double",
            ConfigValue::Int(_) => "int",
            ConfigValue::Str(_) => "string",
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Double(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

/// Constants shared by every recipe of one engine instance.
#[derive(Debug, Clone, Default)]
pub struct ConfigVars {
    values: HashMap<String, ConfigValue>,
}

impl ConfigVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a constant.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(name.into(), value.into());
    }

    fn get(&self, name: &str) -> Result<&ConfigValue, SazonError> {
        self.values.get(name).ok_or_else(|| SazonError::MissingConfig {
            name: name.to_string(),
        })
    }

    pub fn get_double(&self, name: &str) -> Result<f64, SazonError> {
        match self.get(name)? {
            ConfigValue::Double(v) => Ok(*v),
            other => Err(SazonError::ConfigTypeMismatch {
                name: name.to_string(),
                requested: "double",
                stored: other.type_name(),
            }),
        }
    }

    /// Like [`get_double`](Self::get_double), but an absent variable falls
    /// back to `default`. A stored value of the wrong type still fails.
    pub fn get_double_or(&self, name: &str, default: f64) -> Result<f64, SazonError> {
        match self.get_double(name) {
            Ok(v) => Ok(v),
            Err(SazonError::MissingConfig { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64, SazonError> {
        match self.get(name)? {
            ConfigValue::Int(v) => Ok(*v),
            other => Err(SazonError::ConfigTypeMismatch {
                name: name.to_string(),
                requested: "int",
                stored: other.type_name(),
            }),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<String, SazonError> {
        match self.get(name)? {
            ConfigValue::Str(v) => Ok(v.clone()),
            other => Err(SazonError::ConfigTypeMismatch {
                name: name.to_string(),
                requested: "string",
                stored: other.type_name(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sz002_set_and_get_typed() {
        let mut vars = ConfigVars::new();
        vars.set("p0", 1000.0);
        vars.set("iterations", 5i64);
        vars.set("scheme", "hydrostatic");

        assert_eq!(vars.get_double("p0").unwrap(), 1000.0);
        assert_eq!(vars.get_int("iterations").unwrap(), 5);
        assert_eq!(vars.get_string("scheme").unwrap(), "hydrostatic");
    }

    #[test]
    fn test_sz002_missing_config() {
        let vars = ConfigVars::new();
        let err = vars.get_double("kappa").unwrap_err();
        assert_eq!(
            err,
            SazonError::MissingConfig {
                name: "kappa".to_string()
            }
        );
    }

    #[test]
    fn test_sz002_type_mismatch() {
        let mut vars = ConfigVars::new();
        vars.set("p0", "one thousand");
        let err = vars.get_double("p0").unwrap_err();
        assert_eq!(
            err,
            SazonError::ConfigTypeMismatch {
                name: "p0".to_string(),
                requested: "double",
                stored: "string",
            }
        );
    }

    #[test]
    fn test_sz002_int_is_not_double() {
        // No silent widening: an int is only readable as an int.
        let mut vars = ConfigVars::new();
        vars.set("levels", 70i64);
        assert!(matches!(
            vars.get_double("levels"),
            Err(SazonError::ConfigTypeMismatch { .. })
        ));
        assert_eq!(vars.get_int("levels").unwrap(), 70);
    }

    #[test]
    fn test_sz002_set_replaces() {
        let mut vars = ConfigVars::new();
        vars.set("p0", 1000.0);
        vars.set("p0", 850.0);
        assert_eq!(vars.get_double("p0").unwrap(), 850.0);
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_sz002_get_double_or_default() {
        let mut vars = ConfigVars::new();
        assert_eq!(vars.get_double_or("kappa", 0.286).unwrap(), 0.286);

        vars.set("kappa", 0.25);
        assert_eq!(vars.get_double_or("kappa", 0.286).unwrap(), 0.25);

        // A wrongly-typed value is an error, not a fallback.
        vars.set("kappa", "warm");
        assert!(vars.get_double_or("kappa", 0.286).is_err());
    }
}
