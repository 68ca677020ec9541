//! Ingredient lines of a customized burger.

use serde::{Deserialize, Serialize};

/// Largest quantity of a single ingredient on one burger.
pub const MAX_QUANTITY: u32 = 10;

/// One ingredient with how many portions of it go on the burger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Ingredient name as shown on the menu.
    pub name: String,
    /// Number of portions, `1..=MAX_QUANTITY`.
    pub quantity: u32,
}

impl IngredientLine {
    /// Build a line, clamping the quantity to `MAX_QUANTITY`.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.min(MAX_QUANTITY),
        }
    }

    /// One portion of every base ingredient, in menu order.
    #[must_use]
    pub fn defaults_for(ingredients: &[String]) -> Vec<Self> {
        normalize_ingredients(ingredients.iter().map(|name| (name.as_str(), None)))
    }
}

/// Normalize a submitted ingredient list into quantity-tagged lines.
///
/// Each item is a name plus the raw quantity field from the form, if any.
///
/// - names are trimmed; empty names are dropped
/// - a missing or unparseable quantity counts as 1
/// - quantities are clamped to `MAX_QUANTITY`; zero removes the ingredient
/// - repeated names are merged into the first occurrence by summing
///
/// ```
/// use burgershop_core::{IngredientLine, normalize_ingredients};
///
/// let lines = normalize_ingredients([
///     ("cheese", Some("2")),
///     ("onion", Some("0")),
///     (" cheese ", None),
/// ]);
/// assert_eq!(lines, vec![IngredientLine::new("cheese", 3)]);
/// ```
pub fn normalize_ingredients<'a, I>(items: I) -> Vec<IngredientLine>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut lines: Vec<IngredientLine> = Vec::new();

    for (name, quantity) in items {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let quantity = quantity
            .and_then(|q| q.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .min(MAX_QUANTITY);

        match lines.iter_mut().find(|line| line.name == name) {
            Some(line) => line.quantity = (line.quantity + quantity).min(MAX_QUANTITY),
            None => lines.push(IngredientLine::new(name, quantity)),
        }
    }

    lines.retain(|line| line.quantity > 0);
    lines
}
