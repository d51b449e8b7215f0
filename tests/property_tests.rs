//! Property-based tests for the sitemap core.
//!
//! These verify the slug and generator invariants across a wide range of
//! inputs, beyond the fixed cases in the unit tests.

use proptest::prelude::*;

use tychem_api::models::Product;
use tychem_api::services::sitemap::{generate_sitemap, slugify};

fn product(id: i32, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: "desc".to_string(),
        quantity: "1 tote".to_string(),
        category: None,
        cas: None,
        location: None,
        manufacturer: None,
        purity: None,
    }
}

fn date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn slug_emits_only_url_safe_characters(name in ".{0,64}") {
        let slug = slugify(&name);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn slug_is_idempotent(name in ".{0,64}") {
        let once = slugify(&name);
        prop_assert_eq!(slugify(&once), once.clone());
    }

    #[test]
    fn slug_is_deterministic(name in ".{0,64}") {
        prop_assert_eq!(slugify(&name), slugify(&name));
    }

    #[test]
    fn slug_never_contains_whitespace(name in "[a-zA-Z0-9 \\t]{0,64}") {
        prop_assert!(!slugify(&name).contains(char::is_whitespace));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn url_count_is_always_len_plus_two(names in proptest::collection::vec(".{0,32}", 0..20)) {
        let products: Vec<Product> = names
            .iter()
            .enumerate()
            .map(|(i, name)| product(i as i32 + 1, name))
            .collect();

        let xml = generate_sitemap(&products, "https://tychem.net", date());
        prop_assert_eq!(xml.matches("<url>").count(), products.len() + 2);
        prop_assert_eq!(xml.matches("</urlset>").count(), 1);
    }

    #[test]
    fn fixed_entries_always_lead(names in proptest::collection::vec("[a-z]{1,16}", 0..10)) {
        let products: Vec<Product> = names
            .iter()
            .enumerate()
            .map(|(i, name)| product(i as i32 + 1, name))
            .collect();

        let xml = generate_sitemap(&products, "https://tychem.net", date());
        let root = xml.find("<loc>https://tychem.net/</loc>").unwrap();
        let listing = xml.find("<loc>https://tychem.net/products</loc>").unwrap();
        prop_assert!(root < listing);

        for name in &names {
            let entry = format!("<loc>https://tychem.net/products/{}</loc>", slugify(name));
            let pos = xml.find(&entry).unwrap();
            prop_assert!(listing < pos);
        }
    }
}
