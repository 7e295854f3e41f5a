//! # Remote Record Store
//!
//! The durable, multi-device side of the workbook. The gateway only ever
//! needs three operations against it, captured by [`RecordStore`]:
//!
//! - point lookup of a participant by exact name, returning at most one id
//! - participant creation that is atomic insert-if-absent (conflict on the
//!   name falls back to fetching the existing row, so two concurrent first
//!   submissions for the same name cannot mint two participants)
//! - response upsert keyed by (participant, axis), so resubmitting a
//!   workbook replaces the stored response instead of appending another row
//!
//! [`postgrest::PostgrestStore`] talks to the hosted Postgres over its REST
//! interface. [`memory::MemoryStore`] keeps everything in process memory and
//! can inject failures at each stage, which is what the tests drive.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::model::AxisDocument;

pub mod memory;
pub mod postgrest;

pub type ParticipantId = Uuid;

/// Identity fields sent on first contact. Only `name` is required; it is the
/// lookup/merge key.
#[derive(Clone, Debug, Serialize)]
pub struct NewParticipant {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Falha ao comunicar com o banco de dados: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("O banco de dados recusou a operação ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Falha ao preparar dados para o banco: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Banco de dados indisponível: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exact-match lookup by participant name. `Ok(None)` means no row.
    async fn find_participant(&self, name: &str) -> Result<Option<ParticipantId>, StoreError>;

    /// Insert-if-absent. When a row with the same name already exists, the
    /// existing id is returned instead of a duplicate being created.
    async fn create_participant(
        &self,
        participant: &NewParticipant,
    ) -> Result<ParticipantId, StoreError>;

    /// Upsert the response for one (participant, axis) pair, carrying the
    /// document verbatim.
    async fn put_response(
        &self,
        participant: ParticipantId,
        document: &AxisDocument,
    ) -> Result<(), StoreError>;
}
