use sea_orm::entity::prelude::*;

/// Append-only assignment audit log.
///
/// `mentor_id` carries no foreign key so history survives mentor deletion;
/// `mentor_name` is a snapshot taken at assignment time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mentor_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub mentor_id: Uuid,
    pub mentor_name: String,
    pub assigned_by: Uuid,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
