use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subagents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub system_prompt: String,
    /// Serialized `ToolScope`: `"*"` for `All`, else a JSON array of names.
    pub tools_json: String,
    pub category: Option<String>,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
