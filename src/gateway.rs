//! # Submission Gateway
//!
//! Reconciles a finalized workbook into the remote store:
//!
//! 1. presence checks on `nome` and `eixo1` — anything missing is a
//!    validation error and the store is never touched
//! 2. participant lookup by exact name — a store failure here is fatal to
//!    the request, nothing gets written on an undefined participant id
//! 3. participant creation only when the lookup found nothing, via the
//!    store's atomic insert-if-absent
//! 4. response upsert keyed by (participant, axis) — resubmitting replaces
//!    the stored response, it never appends a second row
//!
//! The whole store sequence runs under one bounded timeout; the remote side
//! has none of its own.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::info;

use crate::{
    error::AppError,
    model::{AppData, AxisDocument, Eixo1},
    store::{NewParticipant, RecordStore},
};

/// Wire shape of a submission. Optional fields stay optional here so the
/// gateway can answer missing `nome`/`eixo1` with a single consistent
/// validation error instead of a deserialization rejection.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Eixo1Payload {
    #[serde(default)]
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "phone", skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(default)]
    pub eixo1: Option<Eixo1>,
}

impl From<&AppData> for Eixo1Payload {
    fn from(data: &AppData) -> Self {
        let participante = &data.participante;

        let optional = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        Self {
            nome: participante.nome.clone(),
            email: optional(&participante.email),
            telefone: optional(&participante.telefone),
            eixo1: Some(data.eixo1.clone()),
        }
    }
}

/// The one success shape: `{"ok": true}`.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

pub struct SubmissionGateway {
    store: Arc<dyn RecordStore>,
    submit_timeout: Duration,
}

impl SubmissionGateway {
    pub fn new(store: Arc<dyn RecordStore>, submit_timeout: Duration) -> Self {
        Self {
            store,
            submit_timeout,
        }
    }

    pub async fn submit(&self, payload: &Eixo1Payload) -> Result<Ack, AppError> {
        let nome = payload.nome.trim();

        let (nome, eixo1) = match (nome, payload.eixo1.as_ref()) {
            (n, Some(eixo1)) if !n.is_empty() => (n, eixo1),
            _ => {
                return Err(AppError::Validation(
                    "Nome da participante e dados do Eixo 1 são obrigatórios.".to_string(),
                ));
            }
        };

        timeout(self.submit_timeout, self.reconcile(nome, payload, eixo1))
            .await
            .map_err(|_| AppError::Timeout)?
    }

    async fn reconcile(
        &self,
        nome: &str,
        payload: &Eixo1Payload,
        eixo1: &Eixo1,
    ) -> Result<Ack, AppError> {
        let participant = match self.store.find_participant(nome).await? {
            Some(id) => id,
            None => {
                let id = self
                    .store
                    .create_participant(&NewParticipant {
                        name: nome.to_string(),
                        email: payload.email.clone(),
                        phone: payload.telefone.clone(),
                    })
                    .await?;
                info!(%id, "participante criada");
                id
            }
        };

        let document = AxisDocument::Eixo1(eixo1.clone());
        self.store.put_response(participant, &document).await?;

        info!(%participant, axis = document.axis_key(), "resposta registrada");

        Ok(Ack { ok: true })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::model::{LinhaVidaEtapa, MapaIdentidade};
    use crate::store::memory::MemoryStore;

    fn eixo1_preenchido() -> Eixo1 {
        Eixo1 {
            linha_vida: vec![LinhaVidaEtapa {
                fase: "Infância".into(),
                acontecimento: "mudança de cidade".into(),
                sentimento: "medo".into(),
            }],
            mapa_identidade: MapaIdentidade {
                valores: "coragem".into(),
                ..MapaIdentidade::default()
            },
            carta_gratidao: "obrigada".into(),
        }
    }

    fn payload(nome: &str) -> Eixo1Payload {
        Eixo1Payload {
            nome: nome.to_string(),
            eixo1: Some(eixo1_preenchido()),
            ..Eixo1Payload::default()
        }
    }

    fn gateway(store: &Arc<MemoryStore>) -> SubmissionGateway {
        SubmissionGateway::new(store.clone() as Arc<dyn RecordStore>, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn empty_name_never_reaches_the_store() {
        let store = Arc::new(MemoryStore::new());
        let result = gateway(&store).submit(&payload("")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_eixo1_is_a_validation_error() {
        let store = Arc::new(MemoryStore::new());
        let result = gateway(&store)
            .submit(&Eixo1Payload {
                nome: "Ana".into(),
                ..Eixo1Payload::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_submission_creates_participant_and_response() {
        let store = Arc::new(MemoryStore::new());
        let ack = gateway(&store).submit(&payload("Ana")).await.unwrap();

        assert!(ack.ok);

        let participants = store.participants();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].name, "Ana");
        assert!(store.response(participants[0].id, "eixo1").is_some());
    }

    #[tokio::test]
    async fn resubmission_reuses_participant_and_replaces_response() {
        let store = Arc::new(MemoryStore::new());
        let gw = gateway(&store);

        gw.submit(&payload("Ana")).await.unwrap();

        let mut second = payload("Ana");
        if let Some(eixo1) = second.eixo1.as_mut() {
            eixo1.carta_gratidao = "obrigada de novo".into();
        }
        gw.submit(&second).await.unwrap();

        let participants = store.participants();
        assert_eq!(participants.len(), 1, "second submit must reuse the row");
        assert_eq!(store.response_count(), 1, "upsert, not append");

        let stored = store.response(participants[0].id, "eixo1").unwrap();
        assert_eq!(stored["cartaGratidao"], "obrigada de novo");
    }

    #[tokio::test]
    async fn lookup_failure_is_fatal_and_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        store.fail_lookups();

        let result = gateway(&store).submit(&payload("Ana")).await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
        assert!(store.participants().is_empty());
    }

    #[tokio::test]
    async fn participant_insert_failure_is_fatal() {
        let store = Arc::new(MemoryStore::new());
        store.fail_participant_inserts();

        let result = gateway(&store).submit(&payload("Ana")).await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert!(store.participants().is_empty());
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.response_count(), 0);
    }

    #[tokio::test]
    async fn response_failure_leaves_orphan_participant() {
        let store = Arc::new(MemoryStore::new());
        store.fail_response_writes();

        let result = gateway(&store).submit(&payload("Ana")).await;

        assert!(matches!(result, Err(AppError::Store(_))));
        // Not rolled back: the participant row survives with no response.
        assert_eq!(store.participants().len(), 1);
        assert_eq!(store.response_count(), 0);
    }

    #[tokio::test]
    async fn whitespace_only_name_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let result = gateway(&store).submit(&payload("   ")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn payload_accepts_phone_alias() {
        let payload: Eixo1Payload =
            serde_json::from_str(r#"{"nome":"Ana","phone":"11 99999-8888"}"#).unwrap();
        assert_eq!(payload.telefone.as_deref(), Some("11 99999-8888"));
    }
}
