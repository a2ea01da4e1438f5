use am_domain::{validate_return_rate, Catalog};
use itertools::Itertools;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{event, Level};

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Reads a catalog file, or falls back to the built-in reference catalog when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogLoadError> {
    match path {
        None => Ok(Catalog::reference()),
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            let catalog = parse_catalog(&contents)?;
            event!(
                Level::INFO,
                "Loaded catalog from {} with {} cities, {} resources and {} tiers",
                path.display(),
                catalog.cities.len(),
                catalog.resources.len(),
                catalog.tiers.len()
            );
            Ok(catalog)
        }
    }
}

pub fn parse_catalog(contents: &str) -> Result<Catalog, CatalogLoadError> {
    let deserializer = &mut serde_json::Deserializer::from_str(contents);
    let mut catalog: Catalog = serde_path_to_error::deserialize(deserializer)?;

    validate_catalog(&catalog)?;
    catalog.tiers.sort_by_key(|tier| tier.level);

    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogLoadError> {
    if catalog.cities.is_empty() {
        return Err(invalid("no cities"));
    }
    if catalog.resources.is_empty() {
        return Err(invalid("no resources"));
    }
    if catalog.tiers.is_empty() {
        return Err(invalid("no tiers"));
    }

    ensure_unique("city", catalog.cities.iter().map(|c| c.id.0.as_str()))?;
    ensure_unique("resource", catalog.resources.iter().map(|r| r.id.0.as_str()))?;
    ensure_unique("tier", catalog.tiers.iter().map(|t| t.id.0.as_str()))?;
    ensure_unique("tier level", catalog.tiers.iter().map(|t| t.level.to_string()))?;
    ensure_unique("server", catalog.servers.iter().map(|s| s.id.0.as_str()))?;

    if let Some(resource) = catalog.resources.iter().find(|r| r.ratio == 0) {
        return Err(invalid(&format!("resource {} has a ratio of 0", resource.id)));
    }

    for (city, resource) in catalog.city_bonuses.iter().sorted() {
        if catalog.city(city).is_none() {
            return Err(invalid(&format!("refining bonus for unknown city {city}")));
        }
        if catalog.resource(resource).is_none() {
            return Err(invalid(&format!("refining bonus of {city} names unknown resource {resource}")));
        }
    }

    for rate in catalog.return_rates.all_rates() {
        validate_return_rate(rate).map_err(|err| invalid(&err.to_string()))?;
    }

    Ok(())
}

fn ensure_unique<T: ToString>(what: &str, ids: impl Iterator<Item = T>) -> Result<(), CatalogLoadError> {
    let ids = ids.map(|id| id.to_string()).collect_vec();
    match ids.iter().duplicates().next() {
        Some(duplicate) => Err(invalid(&format!("duplicate {what} {duplicate}"))),
        None => Ok(()),
    }
}

fn invalid(message: &str) -> CatalogLoadError {
    CatalogLoadError::Invalid(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_domain::{ServerId, TierId};
    use std::path::PathBuf;

    fn write_temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("albion-market-{}-{}.json", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn no_path_means_reference_catalog() {
        let catalog = load_catalog(None).unwrap();
        assert_eq!(catalog, Catalog::reference());
    }

    #[test]
    fn reference_catalog_survives_a_file_round_trip() {
        let json = serde_json::to_string_pretty(&Catalog::reference()).unwrap();
        let path = write_temp_file("round-trip", &json);

        let loaded = load_catalog(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, Catalog::reference());
        assert!(loaded.server(&ServerId("europe".to_string())).is_some());
    }

    #[test]
    fn tiers_are_ordered_by_level() {
        let mut catalog = Catalog::reference();
        catalog.tiers.reverse();
        let json = serde_json::to_string(&catalog).unwrap();

        let parsed = parse_catalog(&json).unwrap();

        let tier_ids = parsed.tiers.iter().map(|t| t.id.clone()).collect_vec();
        assert_eq!(tier_ids.first(), Some(&TierId("T4".to_string())));
        assert_eq!(tier_ids.last(), Some(&TierId("T8".to_string())));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("albion-market-does-not-exist.json");
        assert!(matches!(load_catalog(Some(&path)), Err(CatalogLoadError::Io(_))));
    }

    #[test]
    fn malformed_json_reports_the_path() {
        let json = r#"{"cities": [{"id": "Caerleon", "name": "Caerleon", "color": 7}], "resources": [], "tiers": [], "servers": []}"#;

        match parse_catalog(json) {
            Err(CatalogLoadError::Json(err)) => assert_eq!(err.path().to_string(), "cities[0].color"),
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_cities() {
        let mut catalog = Catalog::reference();
        catalog.cities.push(catalog.cities[0].clone());

        let result = parse_catalog(&serde_json::to_string(&catalog).unwrap());

        assert!(matches!(result, Err(CatalogLoadError::Invalid(msg)) if msg.contains("duplicate city Caerleon")));
    }

    #[test]
    fn rejects_empty_tiers() {
        let mut catalog = Catalog::reference();
        catalog.tiers.clear();

        let result = parse_catalog(&serde_json::to_string(&catalog).unwrap());

        assert!(matches!(result, Err(CatalogLoadError::Invalid(msg)) if msg == "no tiers"));
    }

    #[test]
    fn rejects_bonus_for_unknown_resource() {
        let mut catalog = Catalog::reference();
        catalog
            .city_bonuses
            .insert(am_domain::CityId("Caerleon".to_string()), am_domain::ResourceId("SAND".to_string()));

        let result = parse_catalog(&serde_json::to_string(&catalog).unwrap());

        assert!(matches!(result, Err(CatalogLoadError::Invalid(msg)) if msg.contains("SAND")));
    }

    #[test]
    fn rejects_full_return_rate() {
        let mut catalog = Catalog::reference();
        catalog.return_rates.focus_city_bonus = 100.0;

        let result = parse_catalog(&serde_json::to_string(&catalog).unwrap());

        assert!(matches!(result, Err(CatalogLoadError::Invalid(_))));
    }
}
