//! Catalog burgers and their customized derivatives.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use burgershop_core::{
    BurgerId, CustomizedBurgerId, IngredientLine, Price, PriceError, UserId,
};

/// A burger on the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Burger {
    /// Unique burger ID.
    pub id: BurgerId,
    /// Display name.
    pub name: String,
    /// Base price.
    pub price: Price,
    /// Base ingredients, in menu order.
    pub ingredients: Vec<String>,
    /// When the burger was added to the menu.
    pub created_at: DateTime<Utc>,
}

impl Burger {
    /// One portion of every base ingredient.
    #[must_use]
    pub fn default_lines(&self) -> Vec<IngredientLine> {
        IngredientLine::defaults_for(&self.ingredients)
    }
}

/// Errors from the "create burger" form.
///
/// The messages are returned to the browser as the 400 body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BurgerFormError {
    /// Name was blank.
    #[error("Burger name is required")]
    MissingName,
    /// Name exceeds [`NewBurger::MAX_NAME_LENGTH`].
    #[error("Burger name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Price did not parse.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),
    /// No ingredient survived trimming.
    #[error("At least one ingredient is required")]
    NoIngredients,
}

/// Raw "create burger" form submission.
///
/// `ingredients` is a comma- or newline-separated list.
#[derive(Debug, Default, Deserialize)]
pub struct BurgerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub ingredients: String,
}

/// A validated burger ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBurger {
    pub name: String,
    pub price: Price,
    pub ingredients: Vec<String>,
}

impl NewBurger {
    /// Longest accepted burger name.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Validate a form submission.
    ///
    /// Repeated ingredients are kept once, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns the first [`BurgerFormError`] found, checking name, then price,
    /// then ingredients.
    pub fn from_form(form: &BurgerForm) -> Result<Self, BurgerFormError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(BurgerFormError::MissingName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(BurgerFormError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }

        let price = Price::parse(&form.price)?;

        let mut ingredients: Vec<String> = Vec::new();
        for item in form.ingredients.split([',', '\n']) {
            let item = item.trim();
            if !item.is_empty() && !ingredients.iter().any(|existing| existing == item) {
                ingredients.push(item.to_owned());
            }
        }
        if ingredients.is_empty() {
            return Err(BurgerFormError::NoIngredients);
        }

        Ok(Self {
            name: name.to_owned(),
            price,
            ingredients,
        })
    }
}

/// A user's customized version of a catalog burger, created at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizedBurger {
    pub id: CustomizedBurgerId,
    pub user_id: UserId,
    pub burger_id: BurgerId,
    /// Name of the catalog burger it derives from.
    pub burger_name: String,
    pub ingredients: Vec<IngredientLine>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, price: &str, ingredients: &str) -> BurgerForm {
        BurgerForm {
            name: name.to_owned(),
            price: price.to_owned(),
            ingredients: ingredients.to_owned(),
        }
    }

    #[test]
    fn test_new_burger_from_form() {
        let burger =
            NewBurger::from_form(&form(" Classic ", "$8.50", "bun, patty,\ncheese, patty"))
                .unwrap();
        assert_eq!(burger.name, "Classic");
        assert_eq!(burger.price.to_string(), "$8.50");
        assert_eq!(burger.ingredients, vec!["bun", "patty", "cheese"]);
    }

    #[test]
    fn test_new_burger_rejects_blank_fields() {
        assert_eq!(
            NewBurger::from_form(&form("  ", "8", "bun")),
            Err(BurgerFormError::MissingName)
        );
        assert_eq!(
            NewBurger::from_form(&form("Classic", "8", " , ,")),
            Err(BurgerFormError::NoIngredients)
        );
        assert!(matches!(
            NewBurger::from_form(&form("Classic", "eight", "bun")),
            Err(BurgerFormError::Price(_))
        ));
    }

    #[test]
    fn test_default_lines_follow_menu_order() {
        let burger = Burger {
            id: BurgerId::new(1),
            name: "Classic".to_owned(),
            price: Price::parse("8").unwrap(),
            ingredients: vec!["bun".to_owned(), "patty".to_owned()],
            created_at: Utc::now(),
        };
        assert_eq!(
            burger.default_lines(),
            vec![IngredientLine::new("bun", 1), IngredientLine::new("patty", 1)]
        );
    }
}
