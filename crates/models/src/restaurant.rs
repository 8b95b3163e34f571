use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

/// One restaurant document. `reservations` holds the embedded, ordered
/// reservation array exactly as the service serializes it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub reservations: Json,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn db_err(e: DbErr) -> errors::ModelError {
    errors::ModelError::Db(e.to_string())
}

/// Insert a restaurant with an empty reservation array at version 0.
pub async fn create(db: &DatabaseConnection, name: &str, description: &str) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        reservations: Set(Json::Array(Vec::new())),
        version: Set(0),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(db_err)
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(db_err)
}

/// All restaurants, oldest first.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(db_err)
}

/// Overwrite the reservation array iff the row is still at `expected_version`,
/// bumping the version in the same statement. Returns whether a row changed.
pub async fn replace_reservations(
    db: &DatabaseConnection,
    id: Uuid,
    reservations: Json,
    expected_version: i64,
) -> Result<bool, errors::ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::Reservations, Expr::value(reservations))
        .col_expr(Column::Version, Expr::value(expected_version + 1))
        .filter(Column::Id.eq(id))
        .filter(Column::Version.eq(expected_version))
        .exec(db)
        .await
        .map_err(db_err)?;
    Ok(res.rows_affected == 1)
}
