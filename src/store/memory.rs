//! In-memory [`RecordStore`] used by the test suite and for running the
//! server without a remote project configured. Each stage can be told to
//! fail, and every call is counted, so tests can assert exactly which store
//! operations a submission performed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use super::{NewParticipant, ParticipantId, RecordStore, StoreError};
use crate::model::AxisDocument;

#[derive(Clone, Debug)]
pub struct StoredParticipant {
    pub id: ParticipantId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Default)]
struct Inner {
    participants: Vec<StoredParticipant>,
    responses: HashMap<(ParticipantId, &'static str), serde_json::Value>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_find: AtomicBool,
    fail_create: AtomicBool,
    fail_put: AtomicBool,
    pub find_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_lookups(&self) {
        self.fail_find.store(true, Ordering::SeqCst);
    }

    pub fn fail_participant_inserts(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_response_writes(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    pub fn participants(&self) -> Vec<StoredParticipant> {
        self.inner.lock().expect("store poisoned").participants.clone()
    }

    pub fn response(&self, participant: ParticipantId, axis: &str) -> Option<serde_json::Value> {
        self.inner
            .lock()
            .expect("store poisoned")
            .responses
            .iter()
            .find(|((id, key), _)| *id == participant && *key == axis)
            .map(|(_, value)| value.clone())
    }

    pub fn response_count(&self) -> usize {
        self.inner.lock().expect("store poisoned").responses.len()
    }

    fn unavailable(stage: &str) -> StoreError {
        StoreError::Unavailable(format!("falha simulada em {stage}"))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_participant(&self, name: &str) -> Result<Option<ParticipantId>, StoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_find.load(Ordering::SeqCst) {
            return Err(Self::unavailable("busca de participante"));
        }

        let inner = self.inner.lock().expect("store poisoned");
        Ok(inner
            .participants
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id))
    }

    async fn create_participant(
        &self,
        participant: &NewParticipant,
    ) -> Result<ParticipantId, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::unavailable("criação de participante"));
        }

        let mut inner = self.inner.lock().expect("store poisoned");

        // Insert-if-absent: an existing row with the same name wins.
        if let Some(existing) = inner.participants.iter().find(|p| p.name == participant.name) {
            return Ok(existing.id);
        }

        let id = Uuid::new_v4();
        inner.participants.push(StoredParticipant {
            id,
            name: participant.name.clone(),
            email: participant.email.clone(),
            phone: participant.phone.clone(),
        });

        Ok(id)
    }

    async fn put_response(
        &self,
        participant: ParticipantId,
        document: &AxisDocument,
    ) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_put.load(Ordering::SeqCst) {
            return Err(Self::unavailable("gravação da resposta"));
        }

        let value = match document {
            AxisDocument::Eixo1(eixo1) => serde_json::to_value(eixo1)?,
        };

        let mut inner = self.inner.lock().expect("store poisoned");
        inner.responses.insert((participant, document.axis_key()), value);

        Ok(())
    }
}
