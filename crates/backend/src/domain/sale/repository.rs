//! Продажи — внешний контекст движка: строки заказа дают лимиты количества,
//! цены и дату покупки. Движок читает их и меняет только статус продажи
//! (REFUNDED) и создаёт нулевые продажи-замены.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

pub const SALE_STATUS_COMPLETED: &str = "COMPLETED";
pub const SALE_STATUS_REFUNDED: &str = "REFUNDED";

pub mod sale {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "sale")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub user_id: i64,
        pub sale_time: chrono::DateTime<chrono::Utc>,
        pub total_cents: i64,
        pub status: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod sale_item {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "sale_item")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub sale_id: i64,
        pub product_id: i64,
        pub quantity: i32,
        pub price_cents: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<sale::Model>, DbErr> {
    sale::Entity::find_by_id(id).one(db).await
}

/// Строки продажи в порядке создания
pub async fn get_items<C: ConnectionTrait>(
    db: &C,
    sale_id: i64,
) -> Result<Vec<sale_item::Model>, DbErr> {
    sale_item::Entity::find()
        .filter(sale_item::Column::SaleId.eq(sale_id))
        .all(db)
        .await
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    sale_time: chrono::DateTime<Utc>,
    total_cents: i64,
    status: &str,
) -> Result<i64, DbErr> {
    let active = sale::ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        user_id: Set(user_id),
        sale_time: Set(sale_time),
        total_cents: Set(total_cents),
        status: Set(status.to_string()),
    };
    let res = sale::Entity::insert(active).exec(db).await?;
    Ok(res.last_insert_id)
}

pub async fn insert_item<C: ConnectionTrait>(
    db: &C,
    sale_id: i64,
    product_id: i64,
    quantity: i32,
    price_cents: i64,
) -> Result<i64, DbErr> {
    let active = sale_item::ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        sale_id: Set(sale_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        price_cents: Set(price_cents),
    };
    let res = sale_item::Entity::insert(active).exec(db).await?;
    Ok(res.last_insert_id)
}

/// Пометить продажу возмещённой (завершение возврата с решением REFUND)
pub async fn mark_refunded<C: ConnectionTrait>(db: &C, sale_id: i64) -> Result<bool, DbErr> {
    let res = sale::Entity::update_many()
        .col_expr(sale::Column::Status, Expr::value(SALE_STATUS_REFUNDED))
        .filter(sale::Column::Id.eq(sale_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Создать нулевую продажу-замену по возвращаемым позициям.
/// Возвращает id новой продажи для записи в журнал активности.
pub async fn insert_replacement<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    lines: &[(i64, i32)],
) -> Result<i64, DbErr> {
    let sale_id = insert(db, user_id, Utc::now(), 0, SALE_STATUS_COMPLETED).await?;
    for (product_id, quantity) in lines {
        insert_item(db, sale_id, *product_id, *quantity, 0).await?;
    }
    Ok(sale_id)
}
