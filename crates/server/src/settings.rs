//! Typed settings schema for the four dashboard settings areas.
//!
//! Each area has a fixed set of keys with a JSON type and a default. The
//! database stores only overridden keys; [`fold`] lays stored values over
//! the defaults so every read returns the complete key set, and
//! [`validate`] rejects writes that do not fit the schema.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four settings areas shown as tabs on the dashboard settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsArea {
    Store,
    Payment,
    Shipping,
    Brand,
}

impl SettingsArea {
    pub const ALL: [Self; 4] = [Self::Store, Self::Payment, Self::Shipping, Self::Brand];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Payment => "payment",
            Self::Shipping => "shipping",
            Self::Brand => "brand",
        }
    }
}

impl fmt::Display for SettingsArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsArea {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Self::Store),
            "payment" => Ok(Self::Payment),
            "shipping" => Ok(Self::Shipping),
            "brand" => Ok(Self::Brand),
            _ => Err(()),
        }
    }
}

/// JSON type a setting value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Bool,
    Int,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Str => "string",
            Self::Bool => "boolean",
            Self::Int => "integer",
        })
    }
}

/// Default value for a setting key, fixing its type.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
    Int(i64),
}

impl DefaultValue {
    const fn kind(self) -> ValueKind {
        match self {
            Self::Str(_) => ValueKind::Str,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
        }
    }

    fn to_value(self) -> serde_json::Value {
        match self {
            Self::Str(s) => serde_json::Value::String(s.to_string()),
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Int(i) => serde_json::Value::from(i),
        }
    }
}

/// One key in an area's schema.
#[derive(Debug, Clone, Copy)]
pub struct KeyDef {
    pub key: &'static str,
    pub default: DefaultValue,
}

const fn def(key: &'static str, default: DefaultValue) -> KeyDef {
    KeyDef { key, default }
}

const STORE_SCHEMA: &[KeyDef] = &[
    def("store_name", DefaultValue::Str("CloudCRM Pro")),
    def("contact_email", DefaultValue::Str("sales@cloudcrm.example")),
    def("contact_phone", DefaultValue::Str("")),
    def("address", DefaultValue::Str("")),
    def("city", DefaultValue::Str("")),
    def("postal_code", DefaultValue::Str("")),
    def("country", DefaultValue::Str("US")),
    def("timezone", DefaultValue::Str("America/New_York")),
    def("currency", DefaultValue::Str("USD")),
];

const PAYMENT_SCHEMA: &[KeyDef] = &[
    def("accept_credit_cards", DefaultValue::Bool(true)),
    def("accept_bank_transfer", DefaultValue::Bool(true)),
    def("payment_terms_days", DefaultValue::Int(30)),
    def("invoice_prefix", DefaultValue::Str("INV-")),
    def("tax_rate_bps", DefaultValue::Int(0)),
    def("minimum_order_cents", DefaultValue::Int(0)),
];

const SHIPPING_SCHEMA: &[KeyDef] = &[
    def("flat_rate_cents", DefaultValue::Int(1500)),
    def("free_shipping_threshold_cents", DefaultValue::Int(50_000)),
    def("handling_days", DefaultValue::Int(2)),
    def("default_carrier", DefaultValue::Str("UPS")),
    def("international_enabled", DefaultValue::Bool(false)),
];

const BRAND_SCHEMA: &[KeyDef] = &[
    def("brand_name", DefaultValue::Str("CloudCRM Pro")),
    def("tagline", DefaultValue::Str("Wholesale clothing, simplified")),
    def("primary_color", DefaultValue::Str("#4F46E5")),
    def("accent_color", DefaultValue::Str("#F59E0B")),
    def("logo_url", DefaultValue::Str("")),
    def("dark_mode", DefaultValue::Bool(false)),
];

/// The schema for one area, in display order.
#[must_use]
pub const fn area_schema(area: SettingsArea) -> &'static [KeyDef] {
    match area {
        SettingsArea::Store => STORE_SCHEMA,
        SettingsArea::Payment => PAYMENT_SCHEMA,
        SettingsArea::Shipping => SHIPPING_SCHEMA,
        SettingsArea::Brand => BRAND_SCHEMA,
    }
}

/// One setting as the API exchanges it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingPair {
    pub key: String,
    pub value: serde_json::Value,
}

fn kind_of(value: &serde_json::Value) -> Option<ValueKind> {
    match value {
        serde_json::Value::String(_) => Some(ValueKind::Str),
        serde_json::Value::Bool(_) => Some(ValueKind::Bool),
        serde_json::Value::Number(n) if n.is_i64() => Some(ValueKind::Int),
        _ => None,
    }
}

/// Lay stored overrides over the area defaults, returning every key in
/// schema order.
///
/// A stored value that fails to parse or has the wrong JSON type falls back
/// to the default; stored keys the schema does not know are skipped. Both
/// cases are logged since they mean someone wrote around the API.
#[must_use]
pub fn fold(area: SettingsArea, stored: &HashMap<String, String>) -> Vec<SettingPair> {
    for key in stored.keys() {
        if !area_schema(area).iter().any(|s| s.key == key) {
            tracing::warn!(%area, key, "ignoring unknown settings key");
        }
    }

    area_schema(area)
        .iter()
        .map(|def| {
            let value = stored
                .get(def.key)
                .and_then(|raw| match serde_json::from_str::<serde_json::Value>(raw) {
                    Ok(v) if kind_of(&v) == Some(def.default.kind()) => Some(v),
                    Ok(_) | Err(_) => {
                        tracing::warn!(
                            %area,
                            key = def.key,
                            "stored settings value does not fit schema, using default"
                        );
                        None
                    }
                })
                .unwrap_or_else(|| def.default.to_value());

            SettingPair {
                key: def.key.to_string(),
                value,
            }
        })
        .collect()
}

/// Check a write batch against the area schema.
///
/// # Errors
///
/// Returns a human-readable message naming the first unknown key or type
/// mismatch.
pub fn validate(area: SettingsArea, pairs: &[SettingPair]) -> Result<(), String> {
    for pair in pairs {
        let Some(def) = area_schema(area).iter().find(|s| s.key == pair.key) else {
            return Err(format!("unknown {area} setting '{}'", pair.key));
        };
        let expected = def.default.kind();
        if kind_of(&pair.value) != Some(expected) {
            return Err(format!("setting '{}' must be a {expected}", pair.key));
        }
    }
    Ok(())
}
