use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role granting full access via the stored-role authorization source.
pub const ADMIN_ROLE: &str = "admin";

/// Default role for newly provisioned accounts.
pub const DEFAULT_ROLE: &str = "member";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    pub display_name: String,
    /// "member" or "admin".
    pub role: String,

    #[sea_orm(has_many)]
    pub climbs: HasMany<super::climb::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
