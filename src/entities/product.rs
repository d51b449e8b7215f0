use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Product;

/// Product row for the relational backend.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key, assigned by the store's auto-increment.
    #[sea_orm(primary_key)]
    pub id: i32,

    #[validate(length(min = 1, max = 255, message = "Product name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Free-text lot size.
    #[validate(length(min = 1, max = 255, message = "Quantity must not be empty"))]
    pub quantity: String,

    pub category: Option<String>,

    /// CAS registry number.
    pub cas_number: Option<String>,

    pub location: Option<String>,

    pub manufacturer: Option<String>,

    pub purity: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

fn reject_empty(field: &str, value: &ActiveValue<String>) -> Result<(), DbErr> {
    match value {
        ActiveValue::Set(s) | ActiveValue::Unchanged(s) if s.trim().is_empty() => Err(
            DbErr::Custom(format!("Validation error: {} must not be empty", field)),
        ),
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    // The id may still be unset on insert, so validation inspects the set
    // values instead of materializing a Model.
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
        }

        reject_empty("name", &active_model.name)?;
        reject_empty("description", &active_model.description)?;
        reject_empty("quantity", &active_model.quantity)?;

        Ok(active_model)
    }
}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            quantity: model.quantity,
            category: model.category,
            cas: model.cas_number,
            location: model.location,
            manufacturer: model.manufacturer,
            purity: model.purity,
        }
    }
}
