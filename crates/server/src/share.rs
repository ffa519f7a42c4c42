// crates/server/src/share.rs
//! Static HTML rendering of a plan for public sharing.

use mealweek_db::PlanWithRecipes;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a plan into a self-contained HTML document.
pub fn render_plan_html(plan: &PlanWithRecipes) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&plan.name)));
    html.push_str(
        "<style>body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
         h2{border-bottom:1px solid #ccc;padding-bottom:.25rem}\
         .calories{color:#666;font-size:.9rem}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(&plan.name)));

    for recipe in &plan.recipes {
        let day = DAY_NAMES
            .get(recipe.day_of_week as usize)
            .copied()
            .unwrap_or("Day");
        html.push_str(&format!(
            "<h2>{day}: {}</h2>\n<p class=\"calories\">{} &middot; {} kcal</p>\n",
            escape(&recipe.title),
            escape(&recipe.category),
            recipe.calories
        ));
        html.push_str("<h3>Ingredients</h3>\n<ul>\n");
        for ingredient in &recipe.ingredients {
            html.push_str(&format!("<li>{}</li>\n", escape(ingredient)));
        }
        html.push_str("</ul>\n<h3>Instructions</h3>\n<ol>\n");
        for step in &recipe.instructions {
            html.push_str(&format!("<li>{}</li>\n", escape(step)));
        }
        html.push_str("</ol>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
