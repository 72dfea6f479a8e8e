use super::{Catalog, Recipe};

/// Free-text query plus optional recipe type; both optional, both case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub query: Option<String>,
    pub kind: Option<String>,
}

impl RecipeFilter {
    pub fn new(query: Option<String>, kind: Option<String>) -> Self {
        // empty strings behave like an absent filter
        let query = query.filter(|q| !q.is_empty());
        let kind = kind.filter(|k| !k.is_empty());
        RecipeFilter { query, kind }
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(q) = &self.query {
            if !searchable_text(recipe).contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if recipe.kind.to_lowercase() != kind.to_lowercase() {
                return false;
            }
        }
        true
    }
}

impl Catalog {
    /// Matching recipes in catalog order.
    pub fn search(&self, filter: &RecipeFilter) -> Vec<&Recipe> {
        self.recipes().iter().filter(|r| filter.matches(r)).collect()
    }
}

fn searchable_text(recipe: &Recipe) -> String {
    let ingredient_names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
    let alternatives: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|i| i.alternatives.join(" "))
        .collect();
    [
        recipe.name.clone(),
        recipe.kind.clone(),
        recipe.tags.join(" "),
        ingredient_names.join(" "),
        alternatives.join(" "),
    ]
    .join(" ")
    .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let recipes: Vec<Recipe> = serde_json::from_value(json!([
            {
                "name": "Caldo Verde", "type": "Soup", "tags": ["portuguese", "winter"], "serves": 4,
                "ingredients": [
                    {"name": "kale", "quantity": 200, "unit": "g", "alternatives": ["couve galega"]},
                    {"name": "chouriço", "quantity": 1, "unit": null}
                ]
            },
            {
                "name": "Pancakes", "type": "Main", "tags": ["breakfast"], "serves": 4,
                "ingredients": [{"name": "flour", "quantity": 200, "unit": "g"}]
            },
            {
                "name": "Leek Soup", "type": "soup", "serves": 2,
                "ingredients": [{"name": "leek", "quantity": 2}]
            }
        ]))
        .unwrap();
        Catalog::from_recipes(recipes).unwrap()
    }

    fn names(hits: Vec<&Recipe>) -> Vec<&str> {
        hits.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn no_filters_returns_everything_in_order() {
        let c = catalog();
        let hits = c.search(&RecipeFilter::new(None, None));
        assert_eq!(names(hits), ["Caldo Verde", "Pancakes", "Leek Soup"]);
    }

    #[test]
    fn query_matches_tags_ingredients_and_alternatives() {
        let c = catalog();
        assert_eq!(names(c.search(&RecipeFilter::new(Some("BREAKFAST".into()), None))), ["Pancakes"]);
        assert_eq!(names(c.search(&RecipeFilter::new(Some("flour".into()), None))), ["Pancakes"]);
        assert_eq!(names(c.search(&RecipeFilter::new(Some("galega".into()), None))), ["Caldo Verde"]);
    }

    #[test]
    fn type_filter_is_case_insensitive() {
        let c = catalog();
        let hits = c.search(&RecipeFilter::new(None, Some("Soup".into())));
        assert_eq!(names(hits), ["Caldo Verde", "Leek Soup"]);
    }

    #[test]
    fn query_and_type_combine() {
        let c = catalog();
        let hits = c.search(&RecipeFilter::new(Some("leek".into()), Some("SOUP".into())));
        assert_eq!(names(hits), ["Leek Soup"]);
    }

    #[test]
    fn empty_query_is_ignored() {
        let c = catalog();
        assert_eq!(c.search(&RecipeFilter::new(Some(String::new()), None)).len(), 3);
    }
}
