use std::fs;
use std::path::Path;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::domain::product::ProductUpsert;

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("error reading products file: {0}")]
    Io(#[from] std::io::Error),
    #[error("error parsing products file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid product entry: {0}")]
    InvalidEntry(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    key: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(deserialize_with = "deserialize_price")]
    price: BigDecimal,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Accepts `749`, `749.5` or `"749.50"`. Floats go through their shortest
/// decimal form so `19.99` stays `19.99`.
fn deserialize_price<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match PriceValue::deserialize(deserializer)? {
        PriceValue::Integer(n) => return Ok(BigDecimal::from(n)),
        PriceValue::Text(text) => text,
        PriceValue::Float(f) => f.to_string(),
    };
    BigDecimal::from_str(text.trim())
        .map_err(|_| serde::de::Error::custom(format!("invalid price '{text}'")))
}

/// Prices are stored as NUMERIC(12, 2).
fn price_limit() -> BigDecimal {
    BigDecimal::from(10_000_000_000i64)
}

impl TryFrom<CatalogEntry> for ProductUpsert {
    type Error = CatalogLoadError;

    fn try_from(entry: CatalogEntry) -> Result<Self, Self::Error> {
        if entry.key.trim().is_empty() {
            return Err(CatalogLoadError::InvalidEntry(format!(
                "product '{}' has an empty key",
                entry.name
            )));
        }
        if entry.price < BigDecimal::from(0) {
            return Err(CatalogLoadError::InvalidEntry(format!(
                "product '{}' has a negative price",
                entry.key
            )));
        }
        if entry.price.with_scale(2) != entry.price {
            return Err(CatalogLoadError::InvalidEntry(format!(
                "product '{}' has a price with more than two decimal places: {}",
                entry.key, entry.price
            )));
        }
        if entry.price >= price_limit() {
            return Err(CatalogLoadError::InvalidEntry(format!(
                "product '{}' has a price above the supported maximum: {}",
                entry.key, entry.price
            )));
        }
        Ok(ProductUpsert {
            key: entry.key,
            name: entry.name,
            description: entry.description,
            price: entry.price.with_scale(2),
            active: entry.active,
        })
    }
}

/// Parses a catalog document. Every entry is validated before any is returned.
pub fn parse_catalog(yaml: &str) -> Result<Vec<ProductUpsert>, CatalogLoadError> {
    let file: CatalogFile = serde_yaml::from_str(yaml)?;
    file.products
        .into_iter()
        .map(ProductUpsert::try_from)
        .collect()
}

pub fn read_catalog_file(path: &Path) -> Result<Vec<ProductUpsert>, CatalogLoadError> {
    let yaml = fs::read_to_string(path)?;
    parse_catalog(&yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn parses_entries_with_defaults() {
        let entries = parse_catalog(
            r#"
products:
  - key: lotus
    name: Lotus
    description: Lotus kit
    price: "749.00"
    active: false
  - key: moon
    name: Moon
    price: 499.5
  - key: tree
    name: Tree of Life
    price: 999
"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].key, "lotus");
        assert!(!entries[0].active);
        assert_eq!(entries[0].price, dec("749.00"));
        assert_eq!(entries[1].description, "");
        assert!(entries[1].active);
        assert_eq!(entries[1].price, dec("499.50"));
        assert_eq!(entries[2].price, dec("999.00"));
    }

    #[test]
    fn unquoted_cents_are_kept_exactly() {
        let entries =
            parse_catalog("products:\n  - {key: kit, name: Kit, price: 19.99}\n").unwrap();
        assert_eq!(entries[0].price, dec("19.99"));
        assert_eq!(entries[0].price.to_string(), "19.99");
    }

    #[test]
    fn rejects_negative_price() {
        let err = parse_catalog("products:\n  - {key: x, name: X, price: \"-1\"}\n").unwrap_err();
        assert!(matches!(err, CatalogLoadError::InvalidEntry(_)));
    }

    #[test]
    fn rejects_sub_cent_prices() {
        let err =
            parse_catalog("products:\n  - {key: x, name: X, price: \"10.005\"}\n").unwrap_err();
        assert!(matches!(err, CatalogLoadError::InvalidEntry(ref msg) if msg.contains("two decimal")));

        let entries =
            parse_catalog("products:\n  - {key: x, name: X, price: \"10.500\"}\n").unwrap();
        assert_eq!(entries[0].price, dec("10.50"));
    }

    #[test]
    fn rejects_price_too_large_for_the_catalog() {
        let err = parse_catalog("products:\n  - {key: x, name: X, price: \"10000000000\"}\n")
            .unwrap_err();
        assert!(matches!(err, CatalogLoadError::InvalidEntry(_)));

        let entries =
            parse_catalog("products:\n  - {key: x, name: X, price: \"9999999999.99\"}\n")
                .unwrap();
        assert_eq!(entries[0].price, dec("9999999999.99"));
    }

    #[test]
    fn rejects_empty_key() {
        let err = parse_catalog("products:\n  - {key: \" \", name: X, price: 1}\n").unwrap_err();
        assert!(matches!(err, CatalogLoadError::InvalidEntry(_)));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(
            parse_catalog("items: []\n"),
            Err(CatalogLoadError::Parse(_))
        ));
        assert!(matches!(
            parse_catalog("products:\n  - {key: x, name: X, price: abc}\n"),
            Err(CatalogLoadError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            read_catalog_file(Path::new("does/not/exist.yaml")),
            Err(CatalogLoadError::Io(_))
        ));
    }

    #[test]
    fn bundled_catalog_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog/products.yaml");
        let entries = read_catalog_file(&path).unwrap();
        assert!(entries.iter().any(|e| e.key == "lotus" && e.active));
        assert!(entries.iter().any(|e| !e.active));
    }
}
