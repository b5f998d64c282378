use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One review per user per mountain, enforced by a unique index created at
/// startup (see `seed::ensure_indexes`).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub mountain_id: i32,
    #[sea_orm(belongs_to, from = "mountain_id", to = "id")]
    pub mountain: HasOne<super::mountain::Entity>,

    /// 1-5 stars.
    pub rating: i32,
    pub body: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
