use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::CatalogError;
use crate::models::Product;

/// XML namespace of the sitemap protocol (sitemaps.org 0.9).
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// URL-safe identifier derived from a product name: lowercase, whitespace
/// runs collapsed to single hyphens, everything outside `[a-z0-9-]`
/// stripped. Distinct names may collapse to the same slug; callers emit
/// duplicates rather than deduplicate.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Render the catalog as a sitemap document.
///
/// Pure: the date is injected by the caller, no clock is read and no I/O
/// happens here. Output entries are the fixed site root (priority 1.0,
/// weekly) and listing page (0.9, daily) followed by one entry per product
/// (0.8, weekly) in the order given.
pub fn generate_sitemap(products: &[Product], base_url: &str, date: NaiveDate) -> String {
    let base = base_url.trim_end_matches('/');
    let lastmod = date.format("%Y-%m-%d");

    let mut xml = String::with_capacity(256 + products.len() * 160);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NS));

    let mut push_url = |loc: &str, changefreq: &str, priority: &str| {
        xml.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{}</priority></url>\n",
            loc, lastmod, changefreq, priority
        ));
    };

    push_url(&format!("{}/", base), "weekly", "1.0");
    push_url(&format!("{}/products", base), "daily", "0.9");

    for product in products {
        let loc = format!("{}/products/{}", base, slugify(&product.name));
        push_url(&loc, "weekly", "0.8");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Thin persistence layered on top of the pure generator.
pub struct SitemapPublisher {
    path: PathBuf,
}

impl SitemapPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, xml: &str) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|err| {
                    CatalogError::Internal(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        err
                    ))
                })?;
            }
        }

        tokio::fs::write(&self.path, xml).await.map_err(|err| {
            CatalogError::Internal(format!("failed to write {}: {}", self.path.display(), err))
        })?;

        debug!(path = %self.path.display(), "sitemap written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, name: &str) -> Product {
        Product {
            id,
            name: name.into(),
            description: "desc".into(),
            quantity: "1 tote".into(),
            category: None,
            cas: None,
            location: None,
            manufacturer: None,
            purity: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn slug_known_cases() {
        assert_eq!(slugify("Sodium Hydroxide"), "sodium-hydroxide");
        assert_eq!(slugify("  Acme   Corp!!  "), "acme-corp");
        assert_eq!(slugify("A B"), "a-b");
        assert_eq!(slugify("A-B"), "a-b");
    }

    #[test]
    fn slug_is_idempotent() {
        let once = slugify("Tri-Sodium Phosphate (98%)");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn url_count_is_products_plus_two() {
        for n in [0usize, 1, 5] {
            let products: Vec<Product> =
                (0..n).map(|i| product(i as i32 + 1, &format!("P {}", i))).collect();
            let xml = generate_sitemap(&products, "https://tychem.net", date());
            assert_eq!(xml.matches("<url>").count(), n + 2, "n = {}", n);
        }
    }

    #[test]
    fn fixed_entries_come_first_in_order() {
        let xml = generate_sitemap(&[product(1, "Methanol")], "https://tychem.net", date());
        let root = xml.find("<loc>https://tychem.net/</loc>").unwrap();
        let listing = xml.find("<loc>https://tychem.net/products</loc>").unwrap();
        let item = xml
            .find("<loc>https://tychem.net/products/methanol</loc>")
            .unwrap();
        assert!(root < listing && listing < item);
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
    }

    #[test]
    fn sodium_hydroxide_scenario() {
        let catalog = vec![Product {
            id: 1,
            name: "Sodium Hydroxide".into(),
            description: "Caustic soda".into(),
            quantity: "40,000 lbs".into(),
            category: None,
            cas: None,
            location: None,
            manufacturer: None,
            purity: None,
        }];
        let xml = generate_sitemap(&catalog, "https://tychem.net", date());
        assert!(xml.contains("<loc>https://tychem.net/products/sodium-hydroxide</loc>"));
        assert!(xml.contains("<lastmod>2025-06-01</lastmod>"));
    }

    #[test]
    fn duplicate_slugs_are_emitted_not_deduplicated() {
        let products = vec![product(1, "A B"), product(2, "A-B")];
        let xml = generate_sitemap(&products, "https://tychem.net", date());
        assert_eq!(
            xml.matches("<loc>https://tychem.net/products/a-b</loc>").count(),
            2
        );
    }

    #[test]
    fn name_that_slugs_to_empty_yields_bare_products_url() {
        let products = vec![product(1, "!!!")];
        let xml = generate_sitemap(&products, "https://tychem.net", date());
        assert!(xml.contains("<loc>https://tychem.net/products/</loc>"));
        assert_eq!(xml.matches("<url>").count(), 3);
    }

    #[test]
    fn trailing_slash_on_base_url_is_normalized() {
        let xml = generate_sitemap(&[], "https://tychem.net/", date());
        assert!(xml.contains("<loc>https://tychem.net/</loc>"));
        assert!(xml.contains("<loc>https://tychem.net/products</loc>"));
    }
}
