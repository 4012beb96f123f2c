//! schema.org `Product` extraction from JSON-LD blocks.

use std::sync::LazyLock;

use mrt_core::StructuredField;
use scraper::Selector;
use serde_json::Value;

use crate::page::RawPage;

static JSONLD_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Product fields recovered from structured data. All values are raw strings;
/// price stays textual so that the caller's price parser sees exactly what
/// the page declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredProduct {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub availability: Option<String>,
    pub brand: Option<String>,
}

impl StructuredProduct {
    #[must_use]
    pub fn field(&self, field: StructuredField) -> Option<&str> {
        match field {
            StructuredField::Name => self.name.as_deref(),
            StructuredField::Sku => self.sku.as_deref(),
            StructuredField::Image => self.image.as_deref(),
            StructuredField::Price => self.price.as_deref(),
            StructuredField::Currency => self.currency.as_deref(),
            StructuredField::Availability => self.availability.as_deref(),
            StructuredField::Brand => self.brand.as_deref(),
        }
    }
}

/// Scans every JSON-LD block in document order and returns the first
/// `Product` found, either at the top level, inside a top-level array, or
/// under `@graph`. Blocks that fail to parse are skipped.
#[must_use]
pub fn extract_structured(page: &RawPage) -> Option<StructuredProduct> {
    page.document()
        .select(&JSONLD_SCRIPT)
        .find_map(|script| {
            let text: String = script.text().collect();
            let value: Value = serde_json::from_str(text.trim()).ok()?;
            find_product(&value).map(product_from_value)
        })
}

fn find_product(value: &Value) -> Option<&Value> {
    let candidates: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    if let Some(product) = candidates.iter().copied().find(|c| is_product(c)) {
        return Some(product);
    }
    candidates
        .iter()
        .filter_map(|c| c.get("@graph").and_then(Value::as_array))
        .flatten()
        .find(|item| is_product(item))
}

/// `@type` may be a plain string or an array of strings.
fn is_product(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("Product"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case("Product")),
        _ => false,
    }
}

fn product_from_value(product: &Value) -> StructuredProduct {
    let offer = first_of(product.get("offers"));
    let spec = offer.and_then(|o| first_of(o.get("priceSpecification")));

    let price = offer
        .and_then(|o| scalar(o.get("price")))
        .or_else(|| spec.and_then(|s| scalar(s.get("price"))));
    let currency = offer
        .and_then(|o| scalar(o.get("priceCurrency")))
        .or_else(|| spec.and_then(|s| scalar(s.get("priceCurrency"))));

    StructuredProduct {
        name: scalar(product.get("name")),
        sku: scalar(product.get("sku")),
        image: image_url(product.get("image")),
        price,
        currency,
        availability: offer.and_then(|o| scalar(o.get("availability"))),
        brand: brand_name(product.get("brand")),
    }
}

/// An object, or the first element of an array.
fn first_of(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Array(items) => items.first(),
        Value::Null => None,
        other => Some(other),
    }
}

/// Non-empty string or number rendered as text.
fn scalar(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn image_url(value: Option<&Value>) -> Option<String> {
    match first_of(value)? {
        obj @ Value::Object(_) => {
            scalar(obj.get("url")).or_else(|| scalar(obj.get("contentUrl")))
        }
        other => scalar(Some(other)),
    }
}

fn brand_name(value: Option<&Value>) -> Option<String> {
    match first_of(value)? {
        obj @ Value::Object(_) => scalar(obj.get("name")),
        other => scalar(Some(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(blocks: &[&str]) -> RawPage {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{b}</script>"#))
            .collect();
        RawPage::parse(
            "https://shop.example.com/produto/x/",
            format!("<html><head>{scripts}</head><body></body></html>"),
        )
    }

    #[test]
    fn price_falls_back_to_price_specification() {
        let page = page_with(&[r#"{
            "@type": "Product",
            "name": "Emperor - Anthems (CD)",
            "offers": {"@type": "Offer", "priceSpecification": {"price": "12.99", "priceCurrency": "EUR"}}
        }"#]);
        let product = extract_structured(&page).unwrap();
        assert_eq!(product.price.as_deref(), Some("12.99"));
        assert_eq!(product.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn direct_offer_price_wins_and_currency_resolves_independently() {
        let page = page_with(&[r#"{
            "@type": "Product",
            "offers": [
                {"price": 19.5, "priceSpecification": [{"price": "99.00", "priceCurrency": "BRL"}]},
                {"price": "1.00", "priceCurrency": "USD"}
            ]
        }"#]);
        let product = extract_structured(&page).unwrap();
        assert_eq!(product.price.as_deref(), Some("19.5"));
        assert_eq!(product.currency.as_deref(), Some("BRL"));
    }

    #[test]
    fn product_inside_graph_is_found() {
        let page = page_with(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "page"},
                {"@type": ["Product", "Thing"], "name": "Album", "sku": 4711,
                 "image": ["https://cdn.example.com/a.jpg"],
                 "brand": [{"@type": "Brand", "name": "Black Metal"}],
                 "offers": {"price": "10", "availability": "https://schema.org/PreOrder"}}
            ]
        }"#]);
        let product = extract_structured(&page).unwrap();
        assert_eq!(product.name.as_deref(), Some("Album"));
        assert_eq!(product.sku.as_deref(), Some("4711"));
        assert_eq!(product.image.as_deref(), Some("https://cdn.example.com/a.jpg"));
        assert_eq!(product.brand.as_deref(), Some("Black Metal"));
        assert_eq!(
            product.availability.as_deref(),
            Some("https://schema.org/PreOrder")
        );
    }

    #[test]
    fn first_product_in_document_order_wins_and_bad_blocks_are_skipped() {
        let page = page_with(&[
            "{ not json",
            r#"{"@type": "Organization", "name": "Shop"}"#,
            r#"[{"@type": "Product", "name": "First"}]"#,
            r#"{"@type": "Product", "name": "Second"}"#,
        ]);
        let product = extract_structured(&page).unwrap();
        assert_eq!(product.name.as_deref(), Some("First"));
    }

    #[test]
    fn brand_may_be_object_or_string_and_absent_is_fine() {
        let page = page_with(&[r#"{"@type": "Product", "brand": {"name": "Atmospheric"}}"#]);
        assert_eq!(
            extract_structured(&page).unwrap().brand.as_deref(),
            Some("Atmospheric")
        );
        let page = page_with(&[r#"{"@type": "Product", "brand": "Raw"}"#]);
        assert_eq!(extract_structured(&page).unwrap().brand.as_deref(), Some("Raw"));
        let page = page_with(&[r#"{"@type": "Product", "name": "x"}"#]);
        let product = extract_structured(&page).unwrap();
        assert_eq!(product.brand, None);
        assert_eq!(product.price, None);
    }

    #[test]
    fn page_without_product_yields_none() {
        let page = page_with(&[r#"{"@type": "BreadcrumbList"}"#]);
        assert!(extract_structured(&page).is_none());
        let page = RawPage::parse("https://x/", "<html></html>");
        assert!(extract_structured(&page).is_none());
    }
}
