use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{ApiBinding, RecentFile, User};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        User::COLLECTION,
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // API bindings
    create_indexes(
        db,
        ApiBinding::COLLECTION,
        vec![index(bson::doc! { "user_id": 1, "is_connected": 1 })],
    )
    .await?;

    // Recent files: one row per (user, file), scanned in insertion order
    create_indexes(
        db,
        RecentFile::COLLECTION,
        vec![
            index_unique(bson::doc! { "user_id": 1, "file_id": 1 }),
            index(bson::doc! { "user_id": 1, "created_at": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
