use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "http_tools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub method: String,
    /// Serialized `HashMap<String, String>`.
    pub headers_json: String,
    /// Serialized `Vec<HttpToolParameter>`.
    pub parameters_json: String,
    pub auth_type: String,
    /// Serialized `HashMap<String, String>`.
    pub auth_config_json: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
