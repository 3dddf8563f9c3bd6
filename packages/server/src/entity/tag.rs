use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    /// The label itself is the identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    #[sea_orm(has_many, via = "handicraft_tag")]
    pub handicrafts: HasMany<super::handicraft::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
