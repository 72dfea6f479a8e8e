//! Read-only recipe catalog: a JSON array of recipes loaded in one shot.

use std::path::Path;

mod error;
pub mod search;
pub mod types;

pub use error::CatalogError;
pub use search::RecipeFilter;
pub use types::{Ingredient, Recipe};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    /// Validates every record; a recipe with a non-positive or non-finite `serves`
    /// would turn every scaled quantity into inf/NaN, so it fails the whole load.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        for r in &recipes {
            if !r.serves.is_finite() || r.serves <= 0.0 {
                return Err(CatalogError::InvalidServes { recipe: r.name.clone(), serves: r.serves });
            }
        }
        Ok(Catalog { recipes })
    }

    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self, CatalogError> {
        let recipes: Vec<Recipe> = serde_json::from_slice(bytes)
            .map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })?;
        Self::from_recipes(recipes)
    }

    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CatalogError::Read { path: path.to_path_buf(), source })?;
        let catalog = Self::from_json(path, &bytes)?;
        tracing::debug!(path = %path.display(), recipes = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Exact name match; the first record wins when names repeat.
    pub fn find(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    pub fn recipes(&self) -> &[Recipe] { &self.recipes }

    pub fn len(&self) -> usize { self.recipes.len() }

    pub fn is_empty(&self) -> bool { self.recipes.is_empty() }
}
