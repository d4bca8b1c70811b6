use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn get<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(db).await
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    price_cents: i64,
    stock: i32,
) -> Result<i64, DbErr> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(name.to_string()),
        price_cents: Set(price_cents),
        stock: Set(stock),
        active: Set(true),
    };
    let res = Entity::insert(active).exec(db).await?;
    Ok(res.last_insert_id)
}

/// Сдвинуть остаток на delta (может быть отрицательным).
/// CHECK (stock >= 0) в схеме не даст уйти в минус.
pub async fn adjust_stock<C: ConnectionTrait>(db: &C, id: i64, delta: i32) -> Result<bool, DbErr> {
    let res = Entity::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).add(delta))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}
