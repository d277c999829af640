//! Listing page extractor
//!
//! Turns one catalog listing page into product records plus the link to
//! the next page, if any.
//!
//! Each listing block is read defensively: a block without a name is skipped
//! and counted, and a block without a price is kept with [`MISSING_PRICE`].
//! One malformed block never voids the rest of the page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One product listing block
pub const PRODUCT_SELECTOR: &str = "article.l-product__horizontal";

/// Display name inside a listing block
pub const NAME_SELECTOR: &str = "span[itemprop=\"name\"]";

/// Base price inside a listing block
pub const PRICE_SELECTOR: &str = "div.l-product__price-base";

/// Pagination control pointing at the following page
pub const NEXT_PAGE_SELECTOR: &str = "a#navigation_2_next_page";

/// Price stored for a listing whose price element is absent
pub const MISSING_PRICE: &str = "";

/// A product record as scraped from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedProduct {
    /// Display name, trimmed; the merge key in storage
    pub name: String,
    /// Price text, trimmed but otherwise verbatim
    pub price: String,
}

impl ScrapedProduct {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }
}

/// Everything extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ParsedListing {
    /// Products in page order
    pub products: Vec<ScrapedProduct>,

    /// Absolute URL of the next page, `None` on the last page
    pub next_url: Option<String>,

    /// Listing blocks dropped because they had no name
    pub skipped: usize,
}

struct ListingSelectors {
    product: Selector,
    name: Selector,
    price: Selector,
    next_page: Selector,
}

impl ListingSelectors {
    fn compile() -> Result<Self, String> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| format!("invalid selector '{}': {:?}", css, e))
        };
        Ok(Self {
            product: parse(PRODUCT_SELECTOR)?,
            name: parse(NAME_SELECTOR)?,
            price: parse(PRICE_SELECTOR)?,
            next_page: parse(NEXT_PAGE_SELECTOR)?,
        })
    }
}

/// Parses a listing page into products and the next-page link
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `base_url` - Site origin that the next-page href is resolved against
///
/// # Returns
///
/// * `Ok(ParsedListing)` - Products found on the page, possibly none
/// * `Err(String)` - The fixed selectors failed to compile
///
/// # Example
///
/// ```
/// use catalog_sync::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<article class="l-product__horizontal">
///     <span itemprop="name"> Drill </span>
///     <div class="l-product__price-base">1 000 ₽</div>
/// </article>"#;
/// let base_url = Url::parse("https://www.maxidom.ru").unwrap();
/// let listing = parse_listing(html, &base_url).unwrap();
/// assert_eq!(listing.products[0].name, "Drill");
/// assert_eq!(listing.next_url, None);
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> Result<ParsedListing, String> {
    let selectors = ListingSelectors::compile()?;
    let document = Html::parse_document(html);

    let mut listing = ParsedListing::default();

    for block in document.select(&selectors.product) {
        let Some(name) = first_text(&block, &selectors.name) else {
            listing.skipped += 1;
            tracing::warn!("Skipping listing block without a product name");
            continue;
        };

        let price = first_text(&block, &selectors.price).unwrap_or_else(|| {
            tracing::debug!("Listing '{}' has no base price", name);
            MISSING_PRICE.to_string()
        });

        listing.products.push(ScrapedProduct { name, price });
    }

    listing.next_url = extract_next_url(&document, &selectors.next_page, base_url);

    Ok(listing)
}

/// Trimmed text of the first element matching `selector`, if non-empty
fn first_text(block: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolves the next-page control against the site origin
fn extract_next_url(document: &Html, selector: &Selector, base_url: &Url) -> Option<String> {
    let href = document
        .select(selector)
        .next()?
        .value()
        .attr("href")?
        .trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        Ok(url) => {
            tracing::warn!("Ignoring next-page link with scheme {}", url.scheme());
            None
        }
        Err(e) => {
            tracing::warn!("Ignoring unresolvable next-page link '{}': {}", href, e);
            None
        }
    }
}
