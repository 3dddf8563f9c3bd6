use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::handicraft;
use crate::error::AppError;
use crate::extractors::multipart::PhotoForm;

use super::shared::{split_csv, split_lines};

/// Validated text fields of a create request.
#[derive(Debug, PartialEq)]
pub struct NewHandicraft {
    pub name: String,
    pub description: String,
    /// Tag names as given, duplicates included.
    pub tags: Vec<String>,
    pub steps: Vec<String>,
}

/// Fields of an update request. `None` leaves the stored value alone.
#[derive(Debug, Default, PartialEq)]
pub struct HandicraftChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<String>>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HandicraftResponse {
    pub id: Uuid,
    #[schema(example = "Bottle vase")]
    pub name: String,
    pub description: String,
    #[schema(example = "https://storage.googleapis.com/rewaste-bucket-capstone/0b1c2d3e-4f50-4617-8899-aabbccddeeff.jpg")]
    pub photo_url: String,
    #[schema(example = json!(["Cut", "Sand", "Finish"]))]
    pub steps: Vec<String>,
    #[schema(example = json!(["wood", "eco"]))]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of a successful create.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreatedHandicraft {
    pub handicraft: HandicraftResponse,
    /// Tag names exactly as parsed from the request.
    pub tags: Vec<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HandicraftListQuery {
    /// Comma-separated tag names. Only handicrafts carrying at least one are returned.
    #[param(example = "wood,eco")]
    pub tags: Option<String>,
}

impl HandicraftResponse {
    pub fn new(m: handicraft::Model, tags: Vec<String>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            photo_url: m.photo_url,
            steps: m.steps,
            tags,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl NewHandicraft {
    pub fn from_form(form: &PhotoForm) -> Result<Self, AppError> {
        let name = form.require_text("name")?.to_string();
        let description = form.require_text("description")?.to_string();
        let tags = parse_tags(form.require_text("tags")?)?;
        let steps = parse_steps(form.require_raw_text("steps")?)?;
        Ok(Self {
            name,
            description,
            tags,
            steps,
        })
    }
}

impl HandicraftChanges {
    pub fn from_form(form: &PhotoForm) -> Result<Self, AppError> {
        Ok(Self {
            name: form.text("name").map(str::to_string),
            description: form.text("description").map(str::to_string),
            steps: form.raw_text("steps").map(parse_steps).transpose()?,
            tags: form.text("tags").map(parse_tags).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn parse_tags(raw: &str) -> Result<Vec<String>, AppError> {
    let tags = split_csv(raw);
    if tags.is_empty() {
        return Err(AppError::Validation(
            "Field 'tags' must contain at least one tag name".into(),
        ));
    }
    Ok(tags)
}

fn parse_steps(raw: &str) -> Result<Vec<String>, AppError> {
    let steps = split_lines(raw);
    if steps.is_empty() {
        return Err(AppError::Validation(
            "Field 'steps' must contain at least one step".into(),
        ));
    }
    Ok(steps)
}
