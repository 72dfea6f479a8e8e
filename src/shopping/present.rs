use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::catalog::types::DEFAULT_CATEGORY;

use super::aggregate::{Aggregate, Aggregation};
use super::quantity::{ESTIMATE_TOKEN, ESTIMATE_UNIT};

/// One line of the rendered list: a category header or an item under it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ShoppingRow {
    Category(CategoryHeader),
    Item(ShoppingItem),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Category,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryHeader {
    #[serde(rename = "type")]
    pub kind: RowKind,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RowQuantity {
    Amount(f64),
    Estimate(&'static str),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: RowQuantity,
    pub unit: Option<String>,
    pub recipes: String,
    pub category: String,
    pub display: String,
}

impl ShoppingRow {
    pub fn header(name: impl Into<String>) -> Self {
        ShoppingRow::Category(CategoryHeader { kind: RowKind::Category, name: name.into() })
    }

    pub fn as_item(&self) -> Option<&ShoppingItem> {
        match self {
            ShoppingRow::Item(item) => Some(item),
            ShoppingRow::Category(_) => None,
        }
    }
}

/// Group aggregates by category (sorted by code point) and sort items by
/// lowercase name; ties keep aggregation order.
pub fn build_list(agg: &Aggregation) -> Vec<ShoppingRow> {
    let mut by_category: BTreeMap<String, Vec<ShoppingItem>> = BTreeMap::new();

    for a in agg.iter() {
        let category = a.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        let recipes = joined_recipes(&a.recipes);
        let bucket = by_category.entry(category.to_string()).or_default();

        let has_estimates = !a.estimate_items.is_empty();
        if !has_estimates || a.quantity > 0.0 {
            bucket.push(numeric_item(a, category, &recipes));
        }
        if has_estimates {
            bucket.push(estimate_item(a, category, &recipes));
        }
    }

    let mut rows = Vec::new();
    for (category, mut items) in by_category {
        items.sort_by_cached_key(|i| i.name.to_lowercase());
        rows.push(ShoppingRow::header(category));
        rows.extend(items.into_iter().map(ShoppingRow::Item));
    }
    rows
}

fn numeric_item(a: &Aggregate, category: &str, recipes: &str) -> ShoppingItem {
    let amount = round2(a.quantity);
    let unit = a.unit.unit().map(str::to_string);
    let display = match &unit {
        Some(u) => format!("{}: {} {}", a.key, format_amount(amount), u),
        None => format!("{}: {}", a.key, format_amount(amount)),
    };
    ShoppingItem {
        name: a.key.clone(),
        quantity: RowQuantity::Amount(amount),
        unit,
        recipes: recipes.to_string(),
        category: category.to_string(),
        display,
    }
}

fn estimate_item(a: &Aggregate, category: &str, recipes: &str) -> ShoppingItem {
    ShoppingItem {
        name: a.key.clone(),
        quantity: RowQuantity::Estimate(ESTIMATE_TOKEN),
        unit: Some(ESTIMATE_UNIT.to_string()),
        recipes: recipes.to_string(),
        category: category.to_string(),
        display: format!("{}: {}", a.key, ESTIMATE_TOKEN),
    }
}

fn joined_recipes(recipes: &HashSet<String>) -> String {
    let mut names: Vec<&str> = recipes.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Two decimals, exact halves go to the even neighbour (0.125 -> 0.12, 0.375 -> 0.38).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Whole amounts keep one decimal ("400.0"), others print their shortest form ("0.33").
pub fn format_amount(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}
