use std::str::FromStr;

use mrt_core::{parse_sites, SitesFile};
use rust_decimal::Decimal;

use super::*;

fn shipped() -> SitesFile {
    parse_sites(include_str!("../../../config/sites.yaml")).unwrap()
}

fn rules(id: &str) -> SiteRules {
    shipped().find(id).unwrap().clone()
}

#[test]
fn structured_data_and_parenthetical_title() {
    let rules = rules("blackmetalstore");
    let page = RawPage::parse(
        "https://blackmetalstore.com/produto/emperor-anthems/",
        r#"<html><head>
          <script type="application/ld+json">{
            "@type": "Product",
            "name": "ignored, h1 wins",
            "sku": "BMS-0042",
            "image": "https://blackmetalstore.com/wp-content/uploads/anthems.jpg",
            "brand": {"@type": "Brand", "name": "Black Metal"},
            "offers": {"price": "89.90", "priceCurrency": "BRL",
                       "availability": "https://schema.org/PreOrder"}
          }</script>
        </head><body>
          <h1>Emperor – Anthems to the Welkin at Dusk (CD)</h1>
          <span class="posted_in"><a>CDs</a> <a>Candlelight</a></span>
        </body></html>"#,
    );

    let record = extract_detail(&page, &rules, None, None).unwrap();
    assert_eq!(record.site, "blackmetalstore");
    assert_eq!(
        record.source_url,
        "https://blackmetalstore.com/produto/emperor-anthems/"
    );
    assert_eq!(record.band, "Emperor");
    assert_eq!(record.album, "Anthems to the Welkin at Dusk");
    assert_eq!(record.media, MediaType::Cd);
    assert_eq!(record.sku.as_deref(), Some("BMS-0042"));
    assert_eq!(record.price, Some(Decimal::from_str("89.90").unwrap()));
    assert_eq!(record.currency.as_deref(), Some("BRL"));
    assert_eq!(record.label.as_deref(), Some("Candlelight"));
    assert_eq!(record.genre.as_deref(), Some("Black Metal"));
    assert_eq!(
        record.photo_url.as_deref(),
        Some("https://blackmetalstore.com/wp-content/uploads/anthems.jpg")
    );
    assert_eq!(record.status, Some(ReleaseStatus::PreOrder));
}

#[test]
fn attribute_table_band_and_declared_format_alias() {
    let rules = rules("napalmrecords");
    let page = RawPage::parse(
        "https://napalmrecords.com/english/kreator-hate-uber-alles",
        r#"<html><head>
          <meta property="og:image" content="https://napalmrecords.com/media/kreator.jpg">
          <meta property="product:price:currency" content="EUR">
        </head><body>
          <h1 class="page-title"><span>Hate Über Alles</span></h1>
          <table id="product-attribute-specs-table">
            <tr><th>Band</th><td>Kreator</td></tr>
            <tr><th>Format</th><td>Digipak</td></tr>
            <tr><th>Genre</th><td>Thrash Metal</td></tr>
            <tr><th>Release Date</th><td>10.06.2022</td></tr>
          </table>
          <script>window.price = {"final_price":"16.99"};</script>
        </body></html>"#,
    );

    let record = extract_detail(&page, &rules, None, None).unwrap();
    assert_eq!(record.band, "Kreator");
    assert_eq!(record.album, "Hate Über Alles");
    assert_eq!(record.media, MediaType::Cd);
    assert_eq!(record.price, Some(Decimal::from_str("16.99").unwrap()));
    assert_eq!(record.currency.as_deref(), Some("EUR"));
    assert_eq!(record.genre.as_deref(), Some("Thrash Metal"));
    assert_eq!(record.release_date.as_deref(), Some("10.06.2022"));
    assert_eq!(record.sku, None);
    assert_eq!(record.status, None);
}

#[test]
fn suffix_tokens_and_category_media_fallback() {
    let rules = rules("paragonrecords");
    let page = RawPage::parse(
        "https://www.paragonrecords.org/products/mgla-age-of-excuse",
        r#"<html><head>
          <meta property="og:price:amount" content="14,00">
          <meta property="og:image" content="//cdn.shopify.com/mgla.jpg">
        </head><body>
          <h1 class="product-single__title">Mgła - Age of Excuse</h1>
          <button class="product-form__cart-submit">Add to cart</button>
        </body></html>"#,
    );

    let record = extract_detail(&page, &rules, None, Some(MediaType::Tape)).unwrap();
    assert_eq!(record.band, "Mgła");
    assert_eq!(record.album, "Age of Excuse");
    assert_eq!(record.media, MediaType::Tape);
    assert_eq!(record.price, Some(Decimal::from_str("14.00").unwrap()));
    assert_eq!(
        record.photo_url.as_deref(),
        Some("https://cdn.shopify.com/mgla.jpg")
    );
    assert_eq!(record.status, None);

    let unknown = extract_detail(&page, &rules, None, None).unwrap();
    assert_eq!(unknown.media, MediaType::Unknown);
}

#[test]
fn suffix_token_hint_classifies_media() {
    let rules = rules("paragonrecords");
    let page = RawPage::parse(
        "https://www.paragonrecords.org/products/mgla-exercises",
        r#"<h1 class="product-single__title">Mgła - Exercises in Futility DIGIPAK CD</h1>"#,
    );
    let record = extract_detail(&page, &rules, None, Some(MediaType::Lp)).unwrap();
    assert_eq!(record.album, "Exercises in Futility");
    assert_eq!(record.media, MediaType::Cd);
}

#[test]
fn listing_values_fill_gaps() {
    let rules = rules("blackmetalstore");
    let page = RawPage::parse(
        "https://blackmetalstore.com/produto/transilvanian-hunger/",
        r#"<h1>Transilvanian Hunger</h1><img class="wp-post-image" src="/img/th.jpg">"#,
    );
    let listing = ListingItem {
        detail_url: page.url().to_owned(),
        band_raw: Some("Darkthrone".into()),
        album_raw: Some("ignored".into()),
        label_raw: Some("Peaceville".into()),
    };

    let record =
        extract_detail(&page, &rules, Some(&listing), Some(MediaType::Lp)).unwrap();
    assert_eq!(record.band, "Darkthrone");
    assert_eq!(record.album, "Transilvanian Hunger");
    assert_eq!(record.label.as_deref(), Some("Peaceville"));
    assert_eq!(record.media, MediaType::Lp);
    assert_eq!(
        record.photo_url.as_deref(),
        Some("https://blackmetalstore.com/img/th.jpg")
    );
}

#[test]
fn missing_band_is_an_error() {
    let rules = rules("blackmetalstore");
    let page = RawPage::parse(
        "https://blackmetalstore.com/produto/x/",
        "<h1>Gift Card</h1>",
    );
    let err = extract_detail(&page, &rules, None, None).unwrap_err();
    assert!(matches!(
        err,
        ScraperError::MissingField { field: "band", .. }
    ));
}

#[test]
fn missing_album_is_an_error() {
    let rules = rules("seasonofmist");
    let page = RawPage::parse(
        "https://shop.season-of-mist.com/x",
        r#"<table id="product-attribute-specs-table"><tr><th>Band</th><td>Gorgoroth</td></tr></table>"#,
    );
    let err = extract_detail(&page, &rules, None, None).unwrap_err();
    assert!(matches!(
        err,
        ScraperError::MissingField { field: "album", .. }
    ));
}

#[test]
fn trailing_segment_site_prefers_table_rows() {
    let rules = rules("seasonofmist");
    let page = RawPage::parse(
        "https://shop.season-of-mist.com/mayhem-daemon-lp",
        r#"<div class="product-name"><h1>MAYHEM - Daemon - LP</h1></div>
           <table id="product-attribute-specs-table">
             <tr><th>Band</th><td>Mayhem</td></tr>
             <tr><th>Title</th><td>Daemon</td></tr>
             <tr><th>Catalog #</th><td>SOM 540LP</td></tr>
             <tr><th>Label</th><td>Century Media</td></tr>
             <tr><th>Generic musical style</th><td>Black Metal</td></tr>
           </table>
           <span class="price">€24,99</span>
           <button class="btn-cart">Pre-order</button>"#,
    );
    let record = extract_detail(&page, &rules, None, None).unwrap();
    assert_eq!(record.band, "Mayhem");
    assert_eq!(record.album, "Daemon");
    assert_eq!(record.media, MediaType::Lp);
    assert_eq!(record.sku.as_deref(), Some("SOM 540LP"));
    assert_eq!(record.label.as_deref(), Some("Century Media"));
    assert_eq!(record.genre.as_deref(), Some("Black Metal"));
    assert_eq!(record.price, Some(Decimal::from_str("24.99").unwrap()));
    assert_eq!(record.status, Some(ReleaseStatus::PreOrder));
}
