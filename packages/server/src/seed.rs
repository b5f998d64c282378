use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::{climb, review};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so we create
/// them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One review per user per mountain.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_review_user_mountain")
        .table(review::Entity)
        .col(review::Column::UserId)
        .col(review::Column::MountainId)
        .unique()
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_review_user_mountain", &stmt).await;

    // "My climbs" listing:
    // SELECT * FROM climb WHERE user_id = ? ORDER BY climbed_on DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_climb_user_climbed_on")
        .table(climb::Entity)
        .col(climb::Column::UserId)
        .col(climb::Column::ClimbedOn)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_climb_user_climbed_on", &stmt).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &str) {
    match db.execute_unprepared(stmt).await {
        Ok(_) => {
            info!("Ensured index {} exists", name);
        }
        Err(e) => {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }
}
