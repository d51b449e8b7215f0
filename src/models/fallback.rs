use super::product::Product;

/// The catalog served when the backing store is unreachable.
///
/// Read paths degrade to this list instead of failing; it is never written
/// back to the store.
pub fn fallback_catalog() -> Vec<Product> {
    const DEFAULTS: [(i32, &str, &str, &str); 10] = [
        (
            1,
            "Sodium Hydroxide",
            "Caustic soda in pellet form, technical grade. Widely used in various industrial processes including chemical manufacturing, paper production, and water treatment.",
            "40,000 lbs",
        ),
        (
            2,
            "Citric Acid",
            "Anhydrous, food grade citric acid. Essential ingredient in food and beverage manufacturing, pharmaceutical formulations, and cleaning products.",
            "15,000 kgs",
        ),
        (
            3,
            "Glycerin",
            "USP grade, 99.7% pure glycerin. Versatile ingredient used in pharmaceutical, personal care, and food applications. Known for its humectant properties.",
            "4 totes",
        ),
        (
            4,
            "Potassium Chloride",
            "High purity potassium chloride suitable for various industrial applications including fertilizers, pharmaceuticals, and food processing.",
            "25,000 kgs",
        ),
        (
            5,
            "Methanol",
            "Technical grade methanol for industrial use. Essential solvent for various chemical processes and manufacturing applications.",
            "6 tankers",
        ),
        (
            6,
            "Sulfuric Acid",
            "Industrial grade sulfuric acid. Fundamental chemical for various industrial processes and manufacturing applications.",
            "3 rail cars",
        ),
        (
            7,
            "Ethylene Glycol",
            "Industrial grade ethylene glycol. Widely used in antifreeze formulations and as a chemical intermediate.",
            "8 totes",
        ),
        (
            8,
            "Sodium Carbonate",
            "Pure soda ash suitable for various industrial applications. Essential in glass manufacturing and chemical processing.",
            "50,000 lbs",
        ),
        (
            9,
            "Acetic Acid",
            "Glacial acetic acid for industrial use. Key ingredient in various chemical processes and manufacturing applications.",
            "12 totes",
        ),
        (
            10,
            "Hydrogen Peroxide",
            "Industrial strength hydrogen peroxide. Essential for bleaching, disinfection, and chemical synthesis.",
            "5 totes",
        ),
    ];

    DEFAULTS
        .iter()
        .map(|&(id, name, description, quantity)| Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            quantity: quantity.to_string(),
            category: None,
            cas: None,
            location: None,
            manufacturer: None,
            purity: None,
        })
        .collect()
}
