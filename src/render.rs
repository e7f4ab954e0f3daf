//! 端末向けのレシピ表示

use recipe_gallery_common::Recipe;
use std::fmt::Write;

/// タグ指定があれば一致するレシピだけ残す
pub fn with_tag(recipes: Vec<Recipe>, tag: Option<&str>) -> Vec<Recipe> {
    match tag {
        Some(tag) => recipes.into_iter().filter(|r| r.has_tag(tag)).collect(),
        None => recipes,
    }
}

/// 一覧の1行
pub fn format_recipe_row(recipe: &Recipe) -> String {
    let cuisine = recipe.cuisine.map(|c| c.label()).unwrap_or("-");
    let difficulty = recipe.difficulty.map(|d| d.as_str()).unwrap_or("-");
    let time = recipe
        .time_labels()
        .first()
        .map(|(_, value)| *value)
        .unwrap_or("-");
    format!(
        "  {:<6} {:<28} {:<16} {:<8} {}",
        recipe.id, recipe.title, cuisine, difficulty, time
    )
}

/// 一覧全体。`columns`があればグリッドの列数も出す
pub fn format_recipe_list(recipes: &[Recipe], columns: Option<u8>) -> String {
    let mut out = format!("📖 レシピ一覧 ({}件)\n\n", recipes.len());
    for recipe in recipes {
        out.push_str(&format_recipe_row(recipe));
        out.push('\n');
    }
    if let Some(columns) = columns {
        let _ = write!(out, "\nグリッド: {}列\n", columns);
    }
    out
}

/// 詳細表示
pub fn format_recipe(recipe: &Recipe) -> String {
    let mut out = String::new();
    // String への write! は失敗しない
    let _ = writeln!(out, "🍜 {} ({})", recipe.title, recipe.id);
    if !recipe.description.is_empty() {
        let _ = writeln!(out, "{}\n", recipe.description);
    }
    if let Some(cuisine) = recipe.cuisine {
        let _ = writeln!(out, "  Cuisine: {}", cuisine.label());
    }
    for (label, value) in recipe.time_labels() {
        let _ = writeln!(out, "  {}: {}", label, value);
    }
    if let Some(difficulty) = recipe.difficulty {
        let _ = writeln!(out, "  Difficulty: {}", difficulty.as_str());
    }
    if let Some(servings) = recipe.servings {
        let _ = writeln!(out, "  Servings: {}", servings);
    }
    let _ = writeln!(out, "  Image: {}", recipe.display_image());

    out.push_str("\nIngredients:\n");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(out, "  - {}", ingredient);
    }
    out.push_str("\nInstructions:\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
    if !recipe.tags.is_empty() {
        let _ = writeln!(out, "\nTags: {}", recipe.tags.join(", "));
    }
    out
}
