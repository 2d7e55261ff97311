//! Quantity identifiers with an embedded unit.
//!
//! Simulator channels are identified by free-form strings such as
//! `"Temperature [C]"` or `"Liquid X-Velocity [m_per_y]"`. A
//! [`QuantityKey`] splits the identifier into name and unit once, at
//! construction, so nothing downstream re-parses strings on access.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// A physical quantity identifier parsed into `(name, unit)`.
///
/// Equality and hashing use the original identifier, so two keys are
/// equal exactly when their source strings are.
///
/// # Examples
///
/// ```
/// use plume_core::QuantityKey;
///
/// let t = QuantityKey::parse("Temperature [C]").unwrap();
/// assert_eq!(t.name(), "Temperature");
/// assert_eq!(t.unit(), Some("C"));
/// assert_eq!(t.to_string(), "Temperature (in C)");
///
/// let id = QuantityKey::parse("Material_ID").unwrap();
/// assert_eq!(id.unit(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuantityKey {
    id: String,
    name: String,
    unit: Option<String>,
}

impl QuantityKey {
    /// Parse an identifier of the form `"Name [unit]"` or `"Name"`.
    ///
    /// An identifier carrying only one of `" ["` and `"]"` is rejected.
    pub fn parse(id: &str) -> Result<Self, FieldError> {
        let open = id.find(" [");
        let close = id.find(']');
        match (open, close) {
            (None, None) => Ok(Self {
                id: id.to_string(),
                name: id.to_string(),
                unit: None,
            }),
            (Some(open), Some(close)) if close >= open + 2 => Ok(Self {
                id: id.to_string(),
                name: id[..open].to_string(),
                unit: Some(id[open + 2..close].to_string()),
            }),
            (Some(_), Some(_)) => Err(FieldError::MalformedQuantity {
                id: id.to_string(),
                reason: "']' precedes ' ['".into(),
            }),
            _ => Err(FieldError::MalformedQuantity {
                id: id.to_string(),
                reason: "identifier must contain both ' [' and ']' or neither".into(),
            }),
        }
    }

    /// The original identifier, e.g. `"Temperature [C]"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The quantity name without unit, e.g. `"Temperature"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit, if the identifier carried one.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// A new key for the same unit with `prefix` prepended to the name.
    ///
    /// `"Temperature [C]".with_prefix("Primary")` is
    /// `"Primary Temperature [C]"`.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let name = format!("{prefix} {}", self.name);
        let id = match &self.unit {
            Some(unit) => format!("{name} [{unit}]"),
            None => name.clone(),
        };
        Self {
            id,
            name,
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for QuantityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} (in {unit})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for QuantityKey {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QuantityKey {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QuantityKey> for String {
    fn from(key: QuantityKey) -> Self {
        key.id
    }
}

/// Names of the given quantities with their units stripped, in order.
pub fn names_without_unit<'a>(keys: impl IntoIterator<Item = &'a QuantityKey>) -> Vec<&'a str> {
    keys.into_iter().map(QuantityKey::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_unit() {
        let k = QuantityKey::parse("Liquid X-Velocity [m_per_y]").unwrap();
        assert_eq!(k.name(), "Liquid X-Velocity");
        assert_eq!(k.unit(), Some("m_per_y"));
        assert_eq!(k.id(), "Liquid X-Velocity [m_per_y]");
    }

    #[test]
    fn dimensionless_unit_is_kept() {
        let k = QuantityKey::parse("ID [-]").unwrap();
        assert_eq!(k.name(), "ID");
        assert_eq!(k.unit(), Some("-"));
        assert_eq!(k.to_string(), "ID (in -)");
    }

    #[test]
    fn no_unit() {
        let k = QuantityKey::parse("Material_ID").unwrap();
        assert_eq!(k.name(), "Material_ID");
        assert!(k.unit().is_none());
        assert_eq!(k.to_string(), "Material_ID");
    }

    #[test]
    fn half_bracketed_is_rejected() {
        assert!(matches!(
            QuantityKey::parse("Temperature [C"),
            Err(FieldError::MalformedQuantity { .. })
        ));
        assert!(matches!(
            QuantityKey::parse("Temperature C]"),
            Err(FieldError::MalformedQuantity { .. })
        ));
    }

    #[test]
    fn prefix_keeps_unit() {
        let k = QuantityKey::parse("Temperature [C]").unwrap();
        let p = k.with_prefix("Other");
        assert_eq!(p.id(), "Other Temperature [C]");
        assert_eq!(p.name(), "Other Temperature");
        assert_eq!(p.unit(), Some("C"));
        assert_eq!(QuantityKey::parse(p.id()).unwrap(), p);
    }

    #[test]
    fn names_without_unit_in_order() {
        let keys: Vec<QuantityKey> = ["Temperature [K]", "Pressure [Pa]", "ID [-]"]
            .iter()
            .map(|s| QuantityKey::parse(s).unwrap())
            .collect();
        assert_eq!(names_without_unit(&keys), vec!["Temperature", "Pressure", "ID"]);
    }

    #[test]
    fn serde_uses_identifier_string() {
        let k = QuantityKey::parse("Temperature [C]").unwrap();
        let s: String = k.clone().into();
        assert_eq!(s, "Temperature [C]");
        assert_eq!(QuantityKey::try_from(s).unwrap(), k);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn name_and_unit_survive_parsing(
                name in "[A-Za-z_][A-Za-z0-9_ -]{0,15}",
                unit in "[A-Za-z_/-]{1,6}",
            ) {
                let id = format!("{name} [{unit}]");
                let k = QuantityKey::parse(&id).unwrap();
                prop_assert_eq!(k.name(), name.as_str());
                prop_assert_eq!(k.unit(), Some(unit.as_str()));
                prop_assert_eq!(k.id(), id.as_str());

                let prefixed = k.with_prefix("Primary");
                prop_assert_eq!(QuantityKey::parse(prefixed.id()).unwrap(), prefixed);
            }
        }
    }
}
