// Item background styles

use pivotgrid_config::color::{contrast_text, parse_css_color};
use pivotgrid_protocol::ColorChoices;
use serde::Serialize;

/// Resolved fill and text colors for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub fill: String,
    pub text: String,
}

/// Resolve a raw color token.
///
/// The host palette wins; otherwise the token itself must be a literal color.
/// Missing text colors follow the fill's luminance. Unknown tokens get no
/// style at all.
pub fn resolve_style(token: &str, palette: &ColorChoices) -> Option<CellStyle> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let choice = palette.get(token);

    let fill = choice
        .and_then(|c| c.fill_color.clone())
        .or_else(|| parse_css_color(token).map(|_| token.to_string()))?;
    let text = choice.and_then(|c| c.text_color.clone()).unwrap_or_else(|| {
        parse_css_color(&fill)
            .map_or("#000000", |color| contrast_text(&color))
            .to_string()
    });

    Some(CellStyle { fill, text })
}
