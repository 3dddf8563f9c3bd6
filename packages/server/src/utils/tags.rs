//! Tag registry: find-or-create by name and the handicraft join rows.

use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{handicraft_tag, tag};

/// Drop repeated names, keeping the first occurrence.
pub fn unique_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Tags with the given names that already exist. Never inserts.
pub async fn find_existing<C: ConnectionTrait>(
    db: &C,
    names: &[String],
) -> Result<Vec<tag::Model>, DbErr> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    tag::Entity::find()
        .filter(tag::Column::Name.is_in(names.iter().cloned()))
        .all(db)
        .await
}

/// Return the tag for every name, creating the ones that do not exist.
///
/// The output lines up with `names`; a name given twice yields the same tag twice.
pub async fn resolve_or_create<C: ConnectionTrait>(
    db: &C,
    names: &[String],
) -> Result<Vec<tag::Model>, DbErr> {
    let unique = unique_names(names);
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let result = tag::Entity::insert_many(unique.iter().map(|name| tag::ActiveModel {
        name: Set(name.clone()),
    }))
    .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
    .exec_without_returning(db)
    .await;

    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }

    let existing: HashMap<String, tag::Model> = find_existing(db, &unique)
        .await?
        .into_iter()
        .map(|t| (t.name.clone(), t))
        .collect();

    names
        .iter()
        .map(|name| {
            existing
                .get(name)
                .cloned()
                .ok_or_else(|| DbErr::RecordNotFound(format!("tag '{name}' missing after insert")))
        })
        .collect()
}

/// Make `names` the complete tag set of a handicraft, in the given order.
///
/// Existing associations are removed first, so the result never holds a
/// duplicate pair.
pub async fn replace_for_handicraft<C: ConnectionTrait>(
    db: &C,
    handicraft_id: Uuid,
    names: &[String],
) -> Result<Vec<String>, DbErr> {
    let tags = resolve_or_create(db, names).await?;
    let names = unique_names(&tags.into_iter().map(|t| t.name).collect::<Vec<_>>());

    handicraft_tag::Entity::delete_many()
        .filter(handicraft_tag::Column::HandicraftId.eq(handicraft_id))
        .exec(db)
        .await?;

    if !names.is_empty() {
        let rows = names
            .iter()
            .enumerate()
            .map(|(position, name)| handicraft_tag::ActiveModel {
                handicraft_id: Set(handicraft_id),
                tag_name: Set(name.clone()),
                position: Set(position as i32),
            });
        handicraft_tag::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }

    Ok(names)
}

/// Tag names of one handicraft in stored order.
pub async fn names_for<C: ConnectionTrait>(
    db: &C,
    handicraft_id: Uuid,
) -> Result<Vec<String>, DbErr> {
    let rows = handicraft_tag::Entity::find()
        .filter(handicraft_tag::Column::HandicraftId.eq(handicraft_id))
        .order_by_asc(handicraft_tag::Column::Position)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.tag_name).collect())
}

/// Tag names for many handicrafts at once, keyed by handicraft id.
pub async fn names_by_handicraft<C: ConnectionTrait>(
    db: &C,
    handicraft_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<String>>, DbErr> {
    let mut by_id: HashMap<Uuid, Vec<String>> = HashMap::new();
    if handicraft_ids.is_empty() {
        return Ok(by_id);
    }

    let rows = handicraft_tag::Entity::find()
        .filter(handicraft_tag::Column::HandicraftId.is_in(handicraft_ids.iter().copied()))
        .order_by_asc(handicraft_tag::Column::HandicraftId)
        .order_by_asc(handicraft_tag::Column::Position)
        .all(db)
        .await?;

    for row in rows {
        by_id.entry(row.handicraft_id).or_default().push(row.tag_name);
    }
    Ok(by_id)
}

/// Ids of handicrafts carrying at least one of the given tags.
pub async fn handicrafts_with_any<C: ConnectionTrait>(
    db: &C,
    names: &[String],
) -> Result<Vec<Uuid>, DbErr> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let rows = handicraft_tag::Entity::find()
        .filter(handicraft_tag::Column::TagName.is_in(names.iter().cloned()))
        .all(db)
        .await?;

    let mut seen = HashSet::new();
    Ok(rows
        .into_iter()
        .map(|r| r.handicraft_id)
        .filter(|id| seen.insert(*id))
        .collect())
}
