//! Dashboard view model.
//!
//! The dashboard fetches the full product list once and filters it locally
//! by category chip.

use catalog_core::dto::Product;

/// Chip that shows every product.
pub const ALL: &str = "All";

/// Label for products stored without a category.
pub const UNCATEGORIZED: &str = "General";

/// Category chips derived from a product list, plus the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChips {
    chips: Vec<String>,
    selected: String,
}

impl Default for CategoryChips {
    fn default() -> Self {
        Self {
            chips: vec![ALL.to_owned()],
            selected: ALL.to_owned(),
        }
    }
}

impl CategoryChips {
    /// `"All"` followed by each distinct category in first-seen order.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let mut chips = Self::default();
        chips.refresh(products);
        chips
    }

    /// Rebuild the chips after the list changed. The selection survives if
    /// its category still exists, otherwise it falls back to `"All"`.
    pub fn refresh(&mut self, products: &[Product]) {
        let mut chips = vec![ALL.to_owned()];
        for product in products {
            let label = chip_label(product);
            if !chips.iter().any(|chip| chip == label) {
                chips.push(label.to_owned());
            }
        }

        if !chips.contains(&self.selected) {
            ALL.clone_into(&mut self.selected);
        }
        self.chips = chips;
    }

    #[must_use]
    pub fn chips(&self) -> &[String] {
        &self.chips
    }

    #[must_use]
    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Select a chip. Returns `false` and keeps the current selection if no
    /// chip has that label.
    pub fn select(&mut self, chip: &str) -> bool {
        if self.chips.iter().any(|c| c == chip) {
            chip.clone_into(&mut self.selected);
            true
        } else {
            false
        }
    }

    /// The products shown under the selected chip, in list order.
    #[must_use]
    pub fn filter<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products
            .iter()
            .filter(|product| self.selected == ALL || chip_label(product) == self.selected)
            .collect()
    }
}

fn chip_label(product: &Product) -> &str {
    match product.category.as_str() {
        "" => UNCATEGORIZED,
        category => category,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use catalog_core::{Category, Price, ProductId, ProductImage, UserId};

    use super::*;

    fn product(title: &str, category: &str) -> Product {
        Product {
            id: ProductId::generate(),
            user_id: UserId::generate(),
            title: title.to_owned(),
            price: Price::ZERO,
            description: String::new(),
            // Bypass `Category::new` so the empty case can be represented.
            category: serde_json::from_value(serde_json::json!(category)).unwrap(),
            image: ProductImage::None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_chips_in_first_seen_order() {
        let products = vec![
            product("Mug", "kitchen"),
            product("Hat", "apparel"),
            product("Pan", "kitchen"),
            product("Box", ""),
        ];
        let chips = CategoryChips::from_products(&products);
        assert_eq!(chips.chips(), ["All", "kitchen", "apparel", "General"]);
        assert_eq!(chips.selected(), ALL);
        assert_eq!(chips.filter(&products).len(), 4);
    }

    #[test]
    fn test_select_filters_exact_category() {
        let products = vec![
            product("Mug", "kitchen"),
            product("Hat", "apparel"),
            product("Pan", "kitchen"),
        ];
        let mut chips = CategoryChips::from_products(&products);

        assert!(chips.select("kitchen"));
        let titles: Vec<_> = chips.filter(&products).iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Mug", "Pan"]);

        assert!(!chips.select("Kitchen"));
        assert_eq!(chips.selected(), "kitchen");
    }

    #[test]
    fn test_refresh_resets_vanished_selection() {
        let mut products = vec![product("Mug", "kitchen"), product("Hat", "apparel")];
        let mut chips = CategoryChips::from_products(&products);
        chips.select("apparel");

        products.pop();
        chips.refresh(&products);
        assert_eq!(chips.selected(), ALL);
        assert_eq!(chips.chips(), ["All", "kitchen"]);
    }

    #[test]
    fn test_empty_list_has_only_all() {
        let chips = CategoryChips::from_products(&[]);
        assert_eq!(chips.chips(), ["All"]);
        assert!(chips.filter(&[]).is_empty());
        assert_eq!(Category::default().as_str(), "general");
    }
}
