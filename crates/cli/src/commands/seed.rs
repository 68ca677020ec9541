//! Seed the menu from a YAML catalog file.
//!
//! ```yaml
//! burgers:
//!   - name: Classic
//!     price: "8.50"
//!     ingredients: [bun, beef patty, lettuce]
//! ```
//!
//! Every entry is validated before the database is touched. Burgers whose
//! name is already on the menu are skipped, so seeding twice is harmless.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use burgershop_storefront::db::{self, BurgerRepository, RepositoryError};
use burgershop_storefront::models::{BurgerForm, BurgerFormError, NewBurger};

use super::{CommandError, database_url};

/// A catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub burgers: Vec<CatalogEntry>,
}

/// One burger in a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Kept as text so prices go through the same parser as the web form.
    pub price: String,
    pub ingredients: Vec<String>,
}

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} invalid catalog entries")]
    Invalid(usize),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Counts reported after a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Seed the menu from `file_path`.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or if the database
/// cannot be reached.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_string()));
    }

    info!(path = %file_path, "Loading catalog");
    let content = tokio::fs::read_to_string(path).await?;
    let burgers = parse_catalog(&content)?;
    info!(burgers = burgers.len(), "Catalog validated");

    if dry_run {
        for burger in &burgers {
            info!("  {} ({}): {}", burger.name, burger.price, burger.ingredients.join(", "));
        }
        return Ok(());
    }

    let pool = db::create_pool(&database_url()?).await?;
    info!("Connected to database");

    let summary = insert_missing(&BurgerRepository::new(&pool), &burgers).await?;

    info!("Seeding complete!");
    info!("  Burgers inserted: {}", summary.inserted);
    info!("  Burgers skipped (already on the menu): {}", summary.skipped);
    Ok(())
}

/// Parse and validate a catalog file.
///
/// Each invalid entry is logged; any invalid entry fails the whole file.
///
/// # Errors
///
/// Returns `SeedError::Yaml` for malformed YAML and `SeedError::Invalid` if
/// any entry fails validation.
pub fn parse_catalog(content: &str) -> Result<Vec<NewBurger>, SeedError> {
    let file: CatalogFile = serde_yaml::from_str(content)?;

    let mut burgers = Vec::with_capacity(file.burgers.len());
    let mut invalid = 0;
    for (index, entry) in file.burgers.iter().enumerate() {
        match validate_entry(entry) {
            Ok(burger) => burgers.push(burger),
            Err(e) => {
                error!("  - entry {} ({:?}): {e}", index + 1, entry.name);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(SeedError::Invalid(invalid));
    }
    Ok(burgers)
}

fn validate_entry(entry: &CatalogEntry) -> Result<NewBurger, BurgerFormError> {
    NewBurger::from_form(&BurgerForm {
        name: entry.name.clone(),
        price: entry.price.clone(),
        ingredients: entry.ingredients.join("\n"),
    })
}

async fn insert_missing(
    repo: &BurgerRepository<'_>,
    burgers: &[NewBurger],
) -> Result<SeedSummary, RepositoryError> {
    let mut existing: HashSet<String> = repo
        .list_all()
        .await?
        .into_iter()
        .map(|burger| burger.name)
        .collect();

    let mut summary = SeedSummary::default();
    for burger in burgers {
        if existing.contains(&burger.name) {
            summary.skipped += 1;
            continue;
        }
        let created = repo.create(burger).await?;
        info!(id = %created.id, name = %created.name, "Inserted burger");
        existing.insert(created.name);
        summary.inserted += 1;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use burgershop_core::Price;

    use super::*;

    #[test]
    fn test_parse_catalog() {
        let burgers = parse_catalog(
            r#"
burgers:
  - name: Classic
    price: "8.50"
    ingredients: [bun, patty, " lettuce ", patty]
  - name: Garden
    price: "9"
    ingredients:
      - bun
      - veggie patty
"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(burgers.len(), 2);
        assert_eq!(burgers[0].name, "Classic");
        assert_eq!(burgers[0].ingredients, vec!["bun", "patty", "lettuce"]);
        assert_eq!(
            burgers[1].price,
            Price::parse("9.00").unwrap_or_else(|e| panic!("{e}"))
        );
    }

    #[test]
    fn test_parse_catalog_rejects_invalid_entries() {
        let result = parse_catalog(
            r#"
burgers:
  - name: ""
    price: "8.50"
    ingredients: [bun]
  - name: Free Lunch
    price: "-1"
    ingredients: [bun]
  - name: Nothing
    price: "5"
    ingredients: []
  - name: Fine
    price: "5"
    ingredients: [bun]
"#,
        );
        assert!(matches!(result, Err(SeedError::Invalid(3))));
    }

    #[test]
    fn test_parse_catalog_rejects_bad_yaml() {
        assert!(matches!(
            parse_catalog("burgers: [name: {"),
            Err(SeedError::Yaml(_))
        ));
        assert!(matches!(parse_catalog("menu: []"), Err(SeedError::Yaml(_))));
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let content = include_str!("../../data/catalog.yaml");
        let burgers = parse_catalog(content).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(burgers.len(), 5);
    }
}
