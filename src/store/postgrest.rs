//! Thin client for the hosted Postgres REST interface.
//!
//! Every call hits `{base}/rest/v1/{table}` with the project key as both
//! `apikey` and bearer token. Conflict handling rides on `on_conflict` plus
//! the `Prefer` header, so insert-if-absent and the response upsert are
//! single round trips with no read-modify-write window.

use std::time::Duration;

use reqwest::{
    Client, RequestBuilder, Response,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::json;

use super::{NewParticipant, ParticipantId, RecordStore, StoreError};
use crate::model::AxisDocument;

const PARTICIPANTS_TABLE: &str = "participants";

#[derive(Deserialize)]
struct IdRow {
    id: ParticipantId,
}

pub struct PostgrestStore {
    http: Client,
    base: String,
}

impl PostgrestStore {
    pub fn new(url: &str, key: &str) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let mut key_value = HeaderValue::from_str(key)
            .map_err(|_| StoreError::Unavailable("chave de acesso inválida".to_string()))?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| StoreError::Unavailable("chave de acesso inválida".to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            http,
            base: url.trim_end_matches('/').to_string(),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/rest/v1/{}", self.base, name)
    }

    fn response_table(document: &AxisDocument) -> String {
        format!("{}_responses", document.axis_key())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // The body carries the Postgres diagnostic; keep it verbatim so the
        // submitting user sees what the store rejected.
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "sem detalhes".to_string());

        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgrestStore {
    async fn find_participant(&self, name: &str) -> Result<Option<ParticipantId>, StoreError> {
        let request = self
            .http
            .get(self.table(PARTICIPANTS_TABLE))
            .query(&[
                ("select", "id"),
                ("name", &format!("eq.{name}")),
                ("limit", "1"),
            ]);

        let rows: Vec<IdRow> = self.send(request).await?.json().await?;

        Ok(rows.into_iter().next().map(|row| row.id))
    }

    async fn create_participant(
        &self,
        participant: &NewParticipant,
    ) -> Result<ParticipantId, StoreError> {
        let request = self
            .http
            .post(self.table(PARTICIPANTS_TABLE))
            .query(&[("on_conflict", "name"), ("select", "id")])
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(participant);

        let rows: Vec<IdRow> = self.send(request).await?.json().await?;

        if let Some(row) = rows.into_iter().next() {
            return Ok(row.id);
        }

        // Conflict path: the row already existed, fetch its id.
        self.find_participant(&participant.name)
            .await?
            .ok_or_else(|| StoreError::Rejected {
                status: 409,
                message: "participante existente não pôde ser recuperado".to_string(),
            })
    }

    async fn put_response(
        &self,
        participant: ParticipantId,
        document: &AxisDocument,
    ) -> Result<(), StoreError> {
        let row = match document {
            AxisDocument::Eixo1(eixo1) => json!({
                "participant_id": participant,
                "linha_vida": eixo1.linha_vida,
                "carta_gratidao": eixo1.carta_gratidao,
                "mapa_identidade": eixo1.mapa_identidade,
            }),
        };

        let request = self
            .http
            .post(self.table(&Self::response_table(document)))
            .query(&[("on_conflict", "participant_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row);

        self.send(request).await?;

        Ok(())
    }
}
