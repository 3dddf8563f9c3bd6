use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::kegiatan;
use crate::error::AppError;
use crate::extractors::multipart::PhotoForm;

/// Validated text fields of a create request.
#[derive(Debug, PartialEq)]
pub struct NewKegiatan {
    pub title: String,
    pub description: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct KegiatanResponse {
    pub id: Uuid,
    #[schema(example = "Beach clean-up")]
    pub title: String,
    pub description: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}

/// Payload of a successful create.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreatedKegiatan {
    pub kegiatan: KegiatanResponse,
}

impl From<kegiatan::Model> for KegiatanResponse {
    fn from(m: kegiatan::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            photo_url: m.photo_url,
            created_at: m.created_at,
        }
    }
}

impl NewKegiatan {
    pub fn from_form(form: &PhotoForm) -> Result<Self, AppError> {
        Ok(Self {
            title: form.require_text("title")?.to_string(),
            description: form.require_text("description")?.to_string(),
        })
    }
}
