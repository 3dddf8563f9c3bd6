use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "handicraft_tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub handicraft_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_name: String,
    #[sea_orm(belongs_to, from = "handicraft_id", to = "id")]
    pub handicraft: HasOne<super::handicraft::Entity>,
    #[sea_orm(belongs_to, from = "tag_name", to = "name")]
    pub tag: HasOne<super::tag::Entity>,

    /// Index of the tag in the handicraft's tag list.
    #[sea_orm(default_value = 0)]
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
