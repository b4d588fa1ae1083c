//! Catalog seed file loading.

use std::path::Path;

use anyhow::Context;
use rental_types::CatalogSeed;

/// Reads a JSON `CatalogSeed` from disk.
pub async fn load_seed(path: &Path) -> anyhow::Result<CatalogSeed> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog seed {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("invalid catalog seed {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "packages": [{{ "name": "Ordinary", "price_per_hour": 1000 }}],
                "cars": [{{
                    "registration_number": "WX 1001",
                    "brand": "Toyota",
                    "model": "Corolla",
                    "package": "Ordinary"
                }}]
            }}"#
        )
        .unwrap();

        let seed = load_seed(file.path()).await.unwrap();

        assert_eq!(seed.packages.len(), 1);
        assert_eq!(seed.packages[0].price_per_hour.amount(), 1000);
        assert_eq!(seed.cars[0].package, "Ordinary");
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "packages": [{{ "name": "Broken", "price_per_hour": -1 }}] }}"#
        )
        .unwrap();

        assert!(load_seed(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seed(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(err.to_string().contains("failed to read catalog seed"));
    }
}
