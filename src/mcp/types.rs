#![cfg(feature = "mcp-server")]

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use crate::plan::{MealPlan, MealType, DEFAULT_MEALS};
use crate::shopping::Selection;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSearchParams {
    /// Case-insensitive text matched against name, type, tags and ingredients
    #[serde(default)]
    pub query: Option<String>,
    /// Recipe type, e.g. "Soup" or "Main" (case-insensitive)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionParam {
    /// Exact recipe name
    pub name: String,
    /// Servings to shop for; 1 when omitted
    #[serde(default)]
    pub servings: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShoppingListParams {
    #[serde(default)]
    pub recipes: Vec<SelectionParam>,
}

impl ShoppingListParams {
    pub fn selections(&self) -> Vec<Selection> {
        to_selections(&self.recipes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanParams {
    /// Number of meals to cover; 7 when omitted
    #[serde(default)]
    pub meals: Option<u32>,
    /// soup, main or both (default)
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub recipes: Vec<SelectionParam>,
}

impl PlanParams {
    pub fn plan(&self) -> MealPlan {
        MealPlan::new(self.meals.unwrap_or(DEFAULT_MEALS), self.meal_type.unwrap_or_default())
    }

    pub fn selections(&self) -> Vec<Selection> {
        to_selections(&self.recipes)
    }
}

fn to_selections(params: &[SelectionParam]) -> Vec<Selection> {
    params
        .iter()
        .map(|s| Selection::new(s.name.clone(), s.servings.unwrap_or(1.0)))
        .collect()
}
