use chrono::Utc;
use contracts::domain::activity::ActivityEntry;
use contracts::domain::common::{Actor, AggregateId};
use contracts::domain::return_request::ReturnRequestId;
use contracts::enums::{ActorRole, ReturnStatus, WorkflowAction};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rma_activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub request_id: String,
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_id: String,
    pub actor_role: String,
    pub notes: Option<String>,
    pub metadata: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ActivityEntry {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, DbErr> {
        let request_id = ReturnRequestId::from_string(&m.request_id).map_err(DbErr::Custom)?;
        let action = WorkflowAction::from_code(&m.action)
            .ok_or_else(|| DbErr::Custom(format!("unknown action code: {}", m.action)))?;
        let from_status = match m.from_status {
            Some(code) => Some(parse_status(&code)?),
            None => None,
        };
        let to_status = parse_status(&m.to_status)?;
        let role = ActorRole::from_code(&m.actor_role)
            .ok_or_else(|| DbErr::Custom(format!("unknown actor role: {}", m.actor_role)))?;
        let metadata = match m.metadata {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .map_err(|e| DbErr::Custom(format!("bad activity metadata: {}", e)))?,
            ),
            None => None,
        };
        Ok(ActivityEntry {
            id: m.id,
            request_id,
            action,
            from_status,
            to_status,
            actor: Actor::new(m.actor_id, role),
            notes: m.notes,
            metadata,
            created_at: m.created_at,
        })
    }
}

fn parse_status(code: &str) -> Result<ReturnStatus, DbErr> {
    ReturnStatus::from_code(code)
        .ok_or_else(|| DbErr::Custom(format!("unknown status code: {}", code)))
}

/// Дописать запись журнала. Журнал не редактируется и не чистится,
/// вызывается только внутри транзакции перехода.
#[allow(clippy::too_many_arguments)]
pub async fn append<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
    action: WorkflowAction,
    from_status: Option<ReturnStatus>,
    to_status: ReturnStatus,
    actor: &Actor,
    notes: Option<String>,
    metadata: Option<serde_json::Value>,
) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        request_id: Set(request_id.as_string()),
        action: Set(action.code().to_string()),
        from_status: Set(from_status.map(|s| s.code().to_string())),
        to_status: Set(to_status.code().to_string()),
        actor_id: Set(actor.id.clone()),
        actor_role: Set(actor.role.code().to_string()),
        notes: Set(notes),
        metadata: Set(metadata.map(|m| m.to_string())),
        created_at: Set(Utc::now()),
    };
    active.insert(db).await?;
    Ok(())
}

/// Хронология заявки (старые записи сверху)
pub async fn list_for_request<C: ConnectionTrait>(
    db: &C,
    request_id: ReturnRequestId,
) -> Result<Vec<ActivityEntry>, DbErr> {
    Entity::find()
        .filter(Column::RequestId.eq(request_id.as_string()))
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}
