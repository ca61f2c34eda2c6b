use std::collections::HashSet;

use crate::recipe::Recipe;

pub const MULTIPLIER_FLOOR: f64 = 0.5;
pub const MULTIPLIER_STEP: f64 = 0.5;

/// Displayed servings for `base` at `multiplier`, rounded half up.
pub fn scale_servings(base: u32, multiplier: f64) -> u32 {
    let v = (base as f64 * multiplier).round();
    if v.is_finite() && v > 0.0 { v as u32 } else { 0 }
}

/// `amount * multiplier` with 0 decimals when multiplier >= 1 and 1 decimal below it.
pub fn scale_quantity(amount: f64, multiplier: f64) -> String {
    let decimals = if multiplier < 1.0 { 1 } else { 0 };
    format_fixed(amount * multiplier, decimals)
}

/// New multiplier after applying `delta`; never below the floor, no ceiling.
pub fn adjust_multiplier(current: f64, delta: f64) -> f64 {
    let next = current + delta;
    if next.is_nan() { return MULTIPLIER_FLOOR; }
    next.max(MULTIPLIER_FLOOR)
}

// rounds half away from zero; std formatting rounds ties to even ("2.5" -> "2")
fn format_fixed(v: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (v * factor).round() / factor;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", decimals, rounded)
}

/// Detail-view state for one open recipe: servings multiplier, ingredient checklist and notes draft.
#[derive(Debug, Clone)]
pub struct ViewSession {
    recipe_id: Option<String>,
    multiplier: f64,
    checked: HashSet<String>,
    notes_draft: String,
}

impl Default for ViewSession {
    fn default() -> Self { Self { recipe_id: None, multiplier: 1.0, checked: HashSet::new(), notes_draft: String::new() } }
}

impl ViewSession {
    pub fn new() -> Self { Self::default() }

    /// Opening a different recipe resets the multiplier, the checklist and the notes draft.
    pub fn open(&mut self, recipe: &Recipe) {
        if self.recipe_id.as_deref() != Some(recipe.id.as_str()) {
            self.recipe_id = Some(recipe.id.clone());
            self.multiplier = 1.0;
            self.checked.clear();
            self.notes_draft = recipe.notes.clone().unwrap_or_default();
        }
    }

    pub fn multiplier(&self) -> f64 { self.multiplier }

    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.multiplier = adjust_multiplier(self.multiplier, delta);
        self.multiplier
    }

    /// One step up, as the detail view's "+" control.
    pub fn increase(&mut self) -> f64 { self.adjust(MULTIPLIER_STEP) }

    pub fn decrease(&mut self) -> f64 { self.adjust(-MULTIPLIER_STEP) }

    pub fn can_decrease(&self) -> bool { self.multiplier > MULTIPLIER_FLOOR }

    /// Toggle `ingredient_id` only if `recipe` has that ingredient; `None` otherwise.
    pub fn check(&mut self, recipe: &Recipe, ingredient_id: &str) -> Option<bool> {
        recipe.ingredients.iter().any(|i| i.id == ingredient_id).then(|| self.toggle(ingredient_id))
    }

    /// Flip the checked state of an ingredient; returns the new state.
    pub fn toggle(&mut self, ingredient_id: &str) -> bool {
        if self.checked.remove(ingredient_id) {
            false
        } else {
            self.checked.insert(ingredient_id.to_string());
            true
        }
    }

    pub fn is_checked(&self, ingredient_id: &str) -> bool { self.checked.contains(ingredient_id) }

    pub fn servings(&self, recipe: &Recipe) -> u32 { scale_servings(recipe.servings, self.multiplier) }

    pub fn quantity(&self, amount: f64) -> String { scale_quantity(amount, self.multiplier) }

    pub fn notes_draft(&self) -> &str { &self.notes_draft }

    pub fn edit_notes(&mut self, text: impl Into<String>) { self.notes_draft = text.into(); }

    /// True when the draft differs from what `recipe` has stored.
    pub fn notes_changed(&self, recipe: &Recipe) -> bool {
        self.notes_draft != recipe.notes.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;
    use chrono::Utc;

    #[test]
    fn quantity_decimals_follow_multiplier() {
        assert_eq!(scale_quantity(2.0, 0.5), "1.0");
        assert_eq!(scale_quantity(2.0, 2.0), "4");
        assert_eq!(scale_quantity(1.5, 1.0), "2");
        assert_eq!(scale_quantity(0.25, 1.0), "0");
        assert_eq!(scale_quantity(0.5, 0.5), "0.3");
        assert_eq!(scale_quantity(3.0, 1.5), "5");
    }

    #[test]
    fn servings_round_to_nearest() {
        assert_eq!(scale_servings(4, 1.0), 4);
        assert_eq!(scale_servings(3, 0.5), 2);
        assert_eq!(scale_servings(5, 1.5), 8);
        assert_eq!(scale_servings(4, 2.5), 10);
    }

    #[test]
    fn multiplier_never_drops_below_floor() {
        assert_eq!(adjust_multiplier(1.0, -0.5), 0.5);
        assert_eq!(adjust_multiplier(0.5, -0.5), 0.5);
        assert_eq!(adjust_multiplier(1.0, -100.0), 0.5);
        assert_eq!(adjust_multiplier(1.0, f64::NEG_INFINITY), 0.5);
        assert_eq!(adjust_multiplier(1.0, 0.5), 1.5);
        assert_eq!(adjust_multiplier(10.0, 40.0), 50.0);
        for delta in [-3.0, -0.5, -0.1, 0.0, 0.1, 0.5, 7.0] {
            for start in [0.5, 1.0, 2.5] {
                assert!(adjust_multiplier(start, delta) >= MULTIPLIER_FLOOR);
            }
        }
    }

    #[test]
    fn session_resets_on_different_recipe() {
        let now = Utc::now();
        let a = Recipe::new("u1", "A", now);
        let b = Recipe::new("u1", "B", now);
        let mut s = ViewSession::new();
        s.open(&a);
        s.increase();
        s.toggle("ing_0");
        assert_eq!(s.multiplier(), 1.5);
        assert!(s.is_checked("ing_0"));

        // reopening the same recipe keeps state
        s.open(&a);
        assert_eq!(s.multiplier(), 1.5);

        s.open(&b);
        assert_eq!(s.multiplier(), 1.0);
        assert!(!s.is_checked("ing_0"));
    }

    #[test]
    fn checklist_toggles() {
        let mut s = ViewSession::new();
        assert!(s.toggle("ing_1"));
        assert!(!s.toggle("ing_1"));
        assert!(!s.is_checked("ing_1"));
    }

    #[test]
    fn decrease_disabled_at_floor() {
        let mut s = ViewSession::new();
        s.decrease();
        assert!(!s.can_decrease());
        assert_eq!(s.decrease(), 0.5);
        assert_eq!(s.increase(), 0.5 + MULTIPLIER_STEP);
        assert!(s.can_decrease());
    }

    #[test]
    fn check_ignores_ingredients_the_recipe_lacks() {
        let mut r = Recipe::new("u1", "A", Utc::now());
        r.ingredients.push(Ingredient { id: "ing_0".into(), name: "Salt".into(), amount: 1.0, unit: "tsp".into(), notes: None });
        let mut s = ViewSession::new();
        s.open(&r);
        assert_eq!(s.check(&r, "ing_9"), None);
        assert!(!s.is_checked("ing_9"));
        assert_eq!(s.check(&r, "ing_0"), Some(true));
        assert_eq!(s.check(&r, "ing_0"), Some(false));
    }

    #[test]
    fn notes_draft_starts_from_stored_notes() {
        let now = Utc::now();
        let a = Recipe::new("u1", "A", now).with_notes(Some("less salt".into()), now);
        let mut s = ViewSession::new();
        s.open(&a);
        assert_eq!(s.notes_draft(), "less salt");
        assert!(!s.notes_changed(&a));
        s.edit_notes("more salt");
        assert!(s.notes_changed(&a));

        let b = Recipe::new("u1", "B", now);
        s.open(&b);
        assert_eq!(s.notes_draft(), "");
        assert!(!s.notes_changed(&b));
    }
}
