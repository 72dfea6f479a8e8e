//! Meal-plan coverage: how many Soup and Main servings a plan needs, and how far
//! the current selections go towards it.

use std::path::Path;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::output::types::Meta;
use crate::shopping::{self, Selection, ShopCmd};
use crate::telemetry::{self};
use crate::telemetry::ops::plan::Phase as PlanPhase;

pub const DEFAULT_MEALS: u32 = 7;
pub const SOUP_TYPE: &str = "Soup";
pub const MAIN_TYPE: &str = "Main";

/// Which courses every planned meal needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[cfg_attr(feature = "mcp-server", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Soup,
    Main,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealPlan {
    meals: u32,
    meal_type: MealType,
}

impl MealPlan {
    /// A zero meal count is read as one meal.
    pub fn new(meals: u32, meal_type: MealType) -> Self {
        MealPlan { meals: meals.max(1), meal_type }
    }

    pub fn meals(&self) -> u32 { self.meals }

    pub fn meal_type(&self) -> MealType { self.meal_type }

    /// Required (soup, main) servings.
    pub fn required(&self) -> (u32, u32) {
        match self.meal_type {
            MealType::Both => (self.meals, self.meals),
            MealType::Soup => (self.meals, 0),
            MealType::Main => (0, self.meals),
        }
    }
}

fn default_meals() -> u32 { DEFAULT_MEALS }

/// Body of `POST /api/plan`: `{"meals": 7, "meal_type": "both", "recipes": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    #[serde(default = "default_meals")]
    pub meals: u32,
    #[serde(default, alias = "mealType")]
    pub meal_type: MealType,
    #[serde(default)]
    pub recipes: Vec<Selection>,
}

impl PlanRequest {
    pub fn plan(&self) -> MealPlan { MealPlan::new(self.meals, self.meal_type) }
}

/// `--meals N --meal-type soup|main|both`, shared by `plan`, `shop` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Meals to cover; `shop`/`export` refuse to build the list until the plan is covered
    #[arg(long)]
    pub meals: Option<u32>,
    /// Courses each meal needs
    #[arg(long, value_enum, default_value_t = MealType::Both)]
    pub meal_type: MealType,
}

impl PlanArgs {
    pub fn plan(&self) -> Option<MealPlan> {
        self.meals.map(|m| MealPlan::new(m, self.meal_type))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    pub selected: f64,
    pub required: u32,
    /// Capped at 100; a course nobody asked for counts as fully covered.
    pub percent: f64,
}

impl Coverage {
    fn new(selected: f64, required: u32) -> Self {
        let percent = if required == 0 {
            100.0
        } else {
            (selected / f64::from(required) * 100.0).min(100.0)
        };
        Coverage { selected, required, percent }
    }

    pub fn is_met(&self) -> bool { self.selected >= f64::from(self.required) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanProgress {
    pub meals: u32,
    pub meal_type: MealType,
    pub soup: Coverage,
    pub main: Coverage,
    pub complete: bool,
    /// Selections that named no catalog recipe; they count towards nothing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<String>,
}

impl PlanProgress {
    pub fn summary_lines(&self) -> Vec<String> {
        match self.meal_type {
            MealType::Both => vec![
                format!("Soup: {} / {} servings", self.soup.selected, self.soup.required),
                format!("Main: {} / {} servings", self.main.selected, self.main.required),
            ],
            MealType::Soup => vec![format!("{} / {} servings selected", self.soup.selected, self.soup.required)],
            MealType::Main => vec![format!("{} / {} servings selected", self.main.selected, self.main.required)],
        }
    }
}

/// Sum selected servings per course. With `both`, only recipes typed exactly
/// `Soup` or `Main` count; a single-course plan counts every known selection.
pub fn progress(plan: &MealPlan, selections: &[Selection], catalog: &Catalog) -> PlanProgress {
    let mut soup = 0.0;
    let mut main = 0.0;
    let mut unknown = Vec::new();

    for selection in selections {
        let Some(recipe) = catalog.find(&selection.name) else {
            unknown.push(selection.name.clone());
            continue;
        };
        match plan.meal_type {
            MealType::Soup => soup += selection.servings,
            MealType::Main => main += selection.servings,
            MealType::Both if recipe.kind == SOUP_TYPE => soup += selection.servings,
            MealType::Both if recipe.kind == MAIN_TYPE => main += selection.servings,
            MealType::Both => {}
        }
    }

    let (soup_required, main_required) = plan.required();
    let soup = Coverage::new(soup, soup_required);
    let main = Coverage::new(main, main_required);
    PlanProgress {
        meals: plan.meals,
        meal_type: plan.meal_type,
        soup,
        main,
        complete: soup.is_met() && main.is_met(),
        unknown,
    }
}

/// Gate used before building a list: every course of the plan must be covered.
pub fn ensure_covered(plan: &MealPlan, selections: &[Selection], catalog: &Catalog) -> Result<PlanProgress> {
    let p = progress(plan, selections, catalog);
    ensure!(p.complete, "meal plan not covered yet: {}", p.summary_lines().join(", "));
    Ok(p)
}

/// meal plan "Caldo Verde:4" "Pancakes:7" --meals 7 --meal-type both
#[derive(Args, Debug)]
pub struct PlanCmd {
    #[command(flatten)]
    pub shop: ShopCmd,
}

pub async fn run(catalog_path: &Path, args: PlanCmd) -> Result<()> {
    let t0 = Instant::now();
    let log = telemetry::plan();
    let plan = MealPlan::new(args.shop.plan.meals.unwrap_or(DEFAULT_MEALS), args.shop.plan.meal_type);
    let _g = log
        .root_span_kv([
            ("meals", plan.meals().to_string()),
            ("meal_type", format!("{:?}", plan.meal_type())),
        ])
        .entered();

    let selections = {
        let _s = log.span(&PlanPhase::ReadSelections).entered();
        shopping::collect_selections(&args.shop).await?
    };
    let catalog = {
        let _s = log.span(&PlanPhase::LoadCatalog).entered();
        Catalog::load(catalog_path).await.context("load recipe catalog")?
    };
    let report = {
        let _s = log.span(&PlanPhase::Tally).entered();
        progress(&plan, &selections, &catalog)
    };

    let _out = log.span(&PlanPhase::Output).entered();
    for line in report.summary_lines() {
        log.info(line);
    }
    for name in &report.unknown {
        log.info(format!("❓ Not in catalog: {name}"));
    }
    log.info(if report.complete { "✅ Plan covered" } else { "⏳ Plan not covered yet" });
    if telemetry::config::json_mode() {
        log.result(&report, Some(Meta::elapsed(t0)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Recipe;
    use serde_json::json;

    fn catalog() -> Catalog {
        let recipes: Vec<Recipe> = serde_json::from_value(json!([
            {"name": "Caldo Verde", "type": "Soup", "serves": 4},
            {"name": "Leek Soup", "type": "Soup", "serves": 2},
            {"name": "Pancakes", "type": "Main", "serves": 4},
            {"name": "Flan", "type": "Dessert", "serves": 6}
        ]))
        .unwrap();
        Catalog::from_recipes(recipes).unwrap()
    }

    #[test]
    fn both_requires_each_course() {
        let plan = MealPlan::new(7, MealType::Both);
        assert_eq!(plan.required(), (7, 7));
        let sel = [Selection::new("Caldo Verde", 4.0), Selection::new("Leek Soup", 3.0), Selection::new("Pancakes", 5.0)];
        let p = progress(&plan, &sel, &catalog());
        assert_eq!(p.soup.selected, 7.0);
        assert!(p.soup.is_met());
        assert_eq!(p.main.selected, 5.0);
        assert!(!p.main.is_met());
        assert!(!p.complete);
        assert_eq!(p.summary_lines(), ["Soup: 7 / 7 servings", "Main: 5 / 7 servings"]);
    }

    #[test]
    fn both_ignores_other_types() {
        let plan = MealPlan::new(2, MealType::Both);
        let sel = [Selection::new("Flan", 6.0), Selection::new("Caldo Verde", 2.0), Selection::new("Pancakes", 2.0)];
        let p = progress(&plan, &sel, &catalog());
        assert_eq!((p.soup.selected, p.main.selected), (2.0, 2.0));
        assert!(p.complete);
    }

    #[test]
    fn single_course_plan_counts_every_known_selection() {
        let plan = MealPlan::new(5, MealType::Soup);
        let sel = [Selection::new("Pancakes", 3.0), Selection::new("Leek Soup", 2.0)];
        let p = progress(&plan, &sel, &catalog());
        assert_eq!(p.soup.selected, 5.0);
        assert_eq!(p.main, Coverage { selected: 0.0, required: 0, percent: 100.0 });
        assert!(p.complete);
        assert_eq!(p.summary_lines(), ["5 / 5 servings selected"]);
    }

    #[test]
    fn percent_is_capped_and_unknown_names_reported() {
        let plan = MealPlan::new(2, MealType::Main);
        let sel = [Selection::new("Pancakes", 3.0), Selection::new("Lasagna", 9.0)];
        let p = progress(&plan, &sel, &catalog());
        assert_eq!(p.main.percent, 100.0);
        assert_eq!(p.main.selected, 3.0);
        assert_eq!(p.unknown, ["Lasagna"]);
    }

    #[test]
    fn request_defaults_to_a_week_of_both() {
        let req: PlanRequest = serde_json::from_value(json!({"recipes": [{"name": "Pancakes"}]})).unwrap();
        assert_eq!(req.plan(), MealPlan::new(7, MealType::Both));
        let camel: PlanRequest = serde_json::from_value(json!({"meals": 3, "mealType": "soup"})).unwrap();
        assert_eq!(camel.plan().required(), (3, 0));
    }

    #[test]
    fn zero_meals_means_one() {
        assert_eq!(MealPlan::new(0, MealType::Main).required(), (0, 1));
    }

    #[test]
    fn serialized_progress_shape() {
        let plan = MealPlan::new(4, MealType::Both);
        let p = progress(&plan, &[Selection::new("Caldo Verde", 2.0)], &catalog());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["meal_type"], "both");
        assert_eq!(v["soup"], json!({"selected": 2.0, "required": 4, "percent": 50.0}));
        assert_eq!(v["main"]["selected"], json!(0.0));
        assert_eq!(v["complete"], false);
        assert!(v.get("unknown").is_none());
    }

    #[test]
    fn gate_refuses_uncovered_plan() {
        let plan = MealPlan::new(3, MealType::Both);
        let err = ensure_covered(&plan, &[Selection::new("Pancakes", 3.0)], &catalog()).unwrap_err();
        assert!(err.to_string().contains("Soup: 0 / 3 servings"));
        let sel = [Selection::new("Pancakes", 3.0), Selection::new("Leek Soup", 3.0)];
        assert!(ensure_covered(&plan, &sel, &catalog()).unwrap().complete);
    }
}
