use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mountain")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    pub prefecture: String,
    pub elevation_m: i32,
    pub description: String, // in Markdown

    /// Best-effort external photo URL. NULL is a normal, displayable state;
    /// the URL may be stale or broken at any time.
    pub photo_url: Option<String>,

    #[sea_orm(has_many)]
    pub climbs: HasMany<super::climb::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
