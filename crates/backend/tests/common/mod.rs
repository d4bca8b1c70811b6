//! Common fixtures for the returns engine integration tests

#![allow(dead_code)]

use backend::domain::return_request::{service, workflow};
use backend::domain::{product, sale};
use backend::shared::data::{db, schema};
use chrono::{Duration, Utc};
use contracts::domain::common::Actor;
use contracts::domain::return_request::{
    DispositionDecision, InspectionOutcome, ReturnRequest, ReturnRequestId, ShippingUpdate,
    SubmitReturnItem, SubmitReturnRequest,
};
use contracts::enums::{ActorRole, InspectionResult, ReturnReason};
use sea_orm::DatabaseConnection;

/// Warranty window used by every test unless it checks expiry explicitly
pub const WARRANTY_DAYS: i64 = 30;

/// Fresh in-memory database with the full schema applied.
/// The pool holds a single connection, so tests see one database.
pub async fn setup() -> DatabaseConnection {
    let db = db::connect_in_memory().await.unwrap();
    schema::apply(&db).await.unwrap();
    db
}

/// What seed_sale created: one buyer, one product, one sale line
pub struct SeededSale {
    pub sale_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub sale_item_id: i64,
    pub quantity: i32,
    pub price_cents: i64,
}

/// One product with the given stock and one completed single-line sale
pub async fn seed_sale(
    db: &DatabaseConnection,
    user_id: i64,
    quantity: i32,
    price_cents: i64,
    stock: i32,
    age_days: i64,
) -> SeededSale {
    let product_id = product::repository::insert(db, "Widget", price_cents, stock)
        .await
        .unwrap();
    let sale_time = Utc::now() - Duration::days(age_days);
    let total = i64::from(quantity) * price_cents;
    let sale_id = sale::repository::insert(db, user_id, sale_time, total, "COMPLETED")
        .await
        .unwrap();
    let sale_item_id =
        sale::repository::insert_item(db, sale_id, product_id, quantity, price_cents)
            .await
            .unwrap();
    SeededSale {
        sale_id,
        user_id,
        product_id,
        sale_item_id,
        quantity,
        price_cents,
    }
}

pub fn staff() -> Actor {
    Actor::new("ops-1", ActorRole::Validator)
}

/// Submit a single-line return request for the seeded sale
pub async fn submit_request(
    db: &DatabaseConnection,
    seeded: &SeededSale,
    quantity: i32,
) -> ReturnRequest {
    let dto = SubmitReturnRequest {
        sale_id: seeded.sale_id,
        reason: ReturnReason::Defective,
        description: "Arrived broken".to_string(),
        evidence_urls: vec!["https://cdn.example/photo-1.jpg".to_string()],
        items: vec![SubmitReturnItem {
            sale_item_id: seeded.sale_item_id,
            quantity,
        }],
    };
    service::submit(db, &Actor::customer(seeded.user_id), dto)
        .await
        .unwrap()
}

/// Drive a freshly submitted request through inspection to DISPOSITION
pub async fn drive_to_disposition(
    db: &DatabaseConnection,
    id: ReturnRequestId,
    decision: DispositionDecision,
) -> ReturnRequest {
    let actor = staff();
    workflow::validate(db, &actor, id, WARRANTY_DAYS, None)
        .await
        .unwrap();
    workflow::update_shipping(
        db,
        &actor,
        id,
        ShippingUpdate {
            carrier: "DHL".to_string(),
            tracking_code: "TRK-0001".to_string(),
        },
    )
    .await
    .unwrap();
    workflow::mark_received(db, &actor, id).await.unwrap();
    workflow::start_inspection(db, &actor, id).await.unwrap();
    workflow::complete_inspection(
        db,
        &actor,
        id,
        InspectionOutcome {
            result: InspectionResult::Defective,
            notes: Some("Cracked casing".to_string()),
        },
    )
    .await
    .unwrap();
    workflow::set_disposition(db, &actor, id, decision)
        .await
        .unwrap()
}

/// Same, but one step further: the request sits in PROCESSING
pub async fn drive_to_processing(
    db: &DatabaseConnection,
    id: ReturnRequestId,
    decision: DispositionDecision,
) -> ReturnRequest {
    drive_to_disposition(db, id, decision).await;
    workflow::process_refund(db, &staff(), id).await.unwrap()
}
