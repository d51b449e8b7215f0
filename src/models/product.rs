use serde::{Deserialize, Serialize};

/// A catalog record as stored and served.
///
/// `name`, `description` and `quantity` are guaranteed non-empty once
/// persisted; the remaining fields are additive metadata carried by some
/// listings and absent from others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Free-text lot size, e.g. "40,000 lbs" or "3 rail cars".
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// CAS registry number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purity: Option<String>,
}

/// Input for creating a product; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purity: Option<String>,
}

/// Partial update; only supplied fields change on the stored record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub cas: Option<String>,
    pub location: Option<String>,
    pub manufacturer: Option<String>,
    pub purity: Option<String>,
}

impl Product {
    /// Rebuild a record from a draft and a store-assigned id.
    pub fn from_draft(id: i32, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            quantity: draft.quantity,
            category: draft.category,
            cas: draft.cas,
            location: draft.location,
            manufacturer: draft.manufacturer,
            purity: draft.purity,
        }
    }

    /// Merge a patch into this record, field by field.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(cas) = patch.cas {
            self.cas = Some(cas);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(manufacturer) = patch.manufacturer {
            self.manufacturer = Some(manufacturer);
        }
        if let Some(purity) = patch.purity {
            self.purity = Some(purity);
        }
    }

    /// Drop the id, yielding a draft suitable for re-insertion.
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            category: self.category,
            cas: self.cas,
            location: self.location,
            manufacturer: self.manufacturer,
            purity: self.purity,
        }
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.category.is_none()
            && self.cas.is_none()
            && self.location.is_none()
            && self.manufacturer.is_none()
            && self.purity.is_none()
    }
}
