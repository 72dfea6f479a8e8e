use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

use super::error::SelectionError;
use super::quantity::{classify, Classified, Quantity};

fn default_servings() -> f64 { 1.0 }

/// A caller's pick: recipe name (exact match) and how many servings to shop for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub name: String,
    #[serde(default = "default_servings")]
    pub servings: f64,
}

impl Selection {
    pub fn new(name: impl Into<String>, servings: f64) -> Self {
        Selection { name: name.into(), servings }
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if !self.servings.is_finite() || self.servings <= 0.0 {
            return Err(SelectionError::InvalidServings { name: self.name.clone(), servings: self.servings });
        }
        Ok(())
    }
}

/// First invalid selection wins; the request is rejected as a whole.
pub fn validate_selections(selections: &[Selection]) -> Result<(), SelectionError> {
    selections.iter().try_for_each(Selection::validate)
}

/// Unit bookkeeping for one merge key. `Fixed(None)` (first amount had no unit) is
/// distinct from `Unset`, so unitless and unit-bearing amounts never share a total.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UnitSlot {
    #[default]
    Unset,
    Fixed(Option<String>),
}

impl UnitSlot {
    pub fn unit(&self) -> Option<&str> {
        match self {
            UnitSlot::Fixed(u) => u.as_deref(),
            UnitSlot::Unset => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimateItem {
    pub quantity: Quantity,
    pub recipe: String,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub key: String,
    pub quantity: f64,
    pub unit: UnitSlot,
    pub estimate_items: Vec<EstimateItem>,
    pub recipes: HashSet<String>,
    pub category: Option<String>,
}

impl Aggregate {
    fn new(key: String) -> Self {
        Aggregate { key, ..Default::default() }
    }

    fn set_category_once(&mut self, category: &str) {
        if self.category.is_none() {
            self.category = Some(category.to_string());
        }
    }
}

/// Merge key -> running aggregate, iterated in first-creation order.
#[derive(Debug, Default)]
pub struct Aggregation {
    entries: Vec<Aggregate>,
    index: HashMap<String, usize>,
    skipped: Vec<String>,
}

impl Aggregation {
    pub fn get_or_create(&mut self, key: &str) -> &mut Aggregate {
        let idx = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push(Aggregate::new(key.to_string()));
                let i = self.entries.len() - 1;
                self.index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.entries[idx]
    }

    pub fn get(&self, key: &str) -> Option<&Aggregate> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aggregate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Selection names that matched no recipe, in input order.
    pub fn skipped(&self) -> &[String] { &self.skipped }
}

/// `"<name> (<unit>)"`, the key a unit-incompatible amount is redirected to.
pub fn split_key(name: &str, unit: Option<&str>) -> String {
    format!("{} ({})", name, unit.unwrap_or("unitless"))
}

/// Scale every selected recipe and merge its ingredients into request-local aggregates.
pub fn aggregate(selections: &[Selection], catalog: &Catalog) -> Aggregation {
    let mut agg = Aggregation::default();

    for selection in selections {
        let Some(recipe) = catalog.find(&selection.name) else {
            agg.skipped.push(selection.name.clone());
            continue;
        };
        let multiplier = selection.servings / recipe.serves;

        for ing in &recipe.ingredients {
            let category = ing.category_or_default();
            let unit = ing.unit.as_deref();

            let entry = agg.get_or_create(&ing.name);
            entry.set_category_once(category);

            let scaled = match classify(&ing.quantity, unit) {
                Classified::Estimate(original) => {
                    entry.estimate_items.push(EstimateItem {
                        quantity: original.clone(),
                        recipe: selection.name.clone(),
                    });
                    entry.recipes.insert(selection.name.clone());
                    continue;
                }
                Classified::Scalable(n) => n * multiplier,
            };

            if entry.unit == UnitSlot::Unset {
                entry.unit = UnitSlot::Fixed(ing.unit.clone());
            }
            if entry.unit.unit() == unit {
                entry.quantity += scaled;
                entry.recipes.insert(selection.name.clone());
                continue;
            }

            // unit clash: accumulate under "<name> (<unit>)", leave the original key alone
            let split = agg.get_or_create(&split_key(&ing.name, unit));
            split.unit = UnitSlot::Fixed(ing.unit.clone());
            split.set_category_once(category);
            split.quantity += scaled;
            split.recipes.insert(selection.name.clone());
        }
    }

    agg
}
