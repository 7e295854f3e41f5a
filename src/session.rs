//! # Form Session
//!
//! The editable workbook held in memory during one interactive session. The
//! session owns the document; the [`DraftStore`] is a passive mirror written
//! after every edit, so a reload resumes exactly where the participant
//! stopped. Nothing here touches the network until the explicit send action.

use tracing::info;

use crate::{
    draft::DraftStore,
    gateway::{Eixo1Payload, SubmissionGateway},
    model::{AppData, LinhaVidaEtapa},
};

/// Fields of one life-timeline entry.
#[derive(Clone, Copy, Debug)]
pub enum CampoEtapa {
    Fase,
    Acontecimento,
    Sentimento,
}

/// Fields of the identity map.
#[derive(Clone, Copy, Debug)]
pub enum CampoMapa {
    Valores,
    Talentos,
    Conquistas,
    Dores,
    Sonhos,
}

/// Fields of the participant identity.
#[derive(Clone, Copy, Debug)]
pub enum CampoParticipante {
    Nome,
    Email,
    Telefone,
}

/// Observable submission state, surfaced to the participant.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Idle,
    Sending,
    Succeeded(String),
    Failed(String),
}

pub struct FormSession {
    data: AppData,
    draft: DraftStore,
    status: SessionStatus,
}

impl FormSession {
    /// Start a session, resuming from the persisted draft when one exists.
    pub fn new(draft: DraftStore) -> Self {
        let data = draft.load();
        Self {
            data,
            draft,
            status: SessionStatus::Idle,
        }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn set_participante(&mut self, campo: CampoParticipante, valor: &str) {
        let participante = &mut self.data.participante;
        match campo {
            CampoParticipante::Nome => participante.nome = valor.to_string(),
            CampoParticipante::Email => participante.email = valor.to_string(),
            CampoParticipante::Telefone => participante.telefone = valor.to_string(),
        }
        self.draft.save(&self.data);
    }

    pub fn set_etapa(&mut self, indice: usize, campo: CampoEtapa, valor: &str) {
        if let Some(etapa) = self.data.eixo1.linha_vida.get_mut(indice) {
            match campo {
                CampoEtapa::Fase => etapa.fase = valor.to_string(),
                CampoEtapa::Acontecimento => etapa.acontecimento = valor.to_string(),
                CampoEtapa::Sentimento => etapa.sentimento = valor.to_string(),
            }
            self.draft.save(&self.data);
        }
    }

    pub fn add_etapa(&mut self) {
        self.data.eixo1.linha_vida.push(LinhaVidaEtapa::default());
        self.draft.save(&self.data);
    }

    pub fn remove_etapa(&mut self, indice: usize) {
        if indice < self.data.eixo1.linha_vida.len() {
            self.data.eixo1.linha_vida.remove(indice);
            self.draft.save(&self.data);
        }
    }

    pub fn set_mapa(&mut self, campo: CampoMapa, valor: &str) {
        let mapa = &mut self.data.eixo1.mapa_identidade;
        match campo {
            CampoMapa::Valores => mapa.valores = valor.to_string(),
            CampoMapa::Talentos => mapa.talentos = valor.to_string(),
            CampoMapa::Conquistas => mapa.conquistas = valor.to_string(),
            CampoMapa::Dores => mapa.dores = valor.to_string(),
            CampoMapa::Sonhos => mapa.sonhos = valor.to_string(),
        }
        self.draft.save(&self.data);
    }

    pub fn set_carta(&mut self, valor: &str) {
        self.data.eixo1.carta_gratidao = valor.to_string();
        self.draft.save(&self.data);
    }

    /// Explicit reset back to the seeded blank workbook.
    pub fn reset(&mut self) {
        self.data = AppData::default();
        self.draft.clear();
        self.draft.save(&self.data);
        self.status = SessionStatus::Idle;
    }

    /// Send the current document to the mentor. Re-entrant calls while a
    /// send is outstanding are ignored; an empty name fails locally without
    /// reaching the gateway.
    pub async fn enviar(&mut self, gateway: &SubmissionGateway) {
        if self.status == SessionStatus::Sending {
            return;
        }

        if self.data.participante.nome.trim().is_empty() {
            self.status =
                SessionStatus::Failed("Preencha o nome antes de enviar.".to_string());
            return;
        }

        self.status = SessionStatus::Sending;
        info!(nome = %self.data.participante.nome, "enviando workbook para a mentora");

        let payload = Eixo1Payload::from(&self.data);
        self.status = match gateway.submit(&payload).await {
            Ok(_) => SessionStatus::Succeeded(
                "Dados enviados para a mentora com sucesso!".to_string(),
            ),
            Err(e) => SessionStatus::Failed(e.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::store::{RecordStore, memory::MemoryStore};

    fn session(dir: &tempfile::TempDir) -> FormSession {
        FormSession::new(DraftStore::new(dir.path(), "afrolumi_app_data"))
    }

    fn gateway(store: &Arc<MemoryStore>) -> SubmissionGateway {
        SubmissionGateway::new(store.clone() as Arc<dyn RecordStore>, Duration::from_secs(5))
    }

    #[test]
    fn edits_survive_a_session_restart() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut s = session(&dir);
            s.set_participante(CampoParticipante::Nome, "Maria");
            s.set_etapa(0, CampoEtapa::Acontecimento, "mudança");
            s.set_mapa(CampoMapa::Sonhos, "viajar");
            s.set_carta("obrigada");
            s.add_etapa();
        }

        let resumed = session(&dir);
        assert_eq!(resumed.data().participante.nome, "Maria");
        assert_eq!(resumed.data().eixo1.linha_vida[0].acontecimento, "mudança");
        assert_eq!(resumed.data().eixo1.mapa_identidade.sonhos, "viajar");
        assert_eq!(resumed.data().eixo1.carta_gratidao, "obrigada");
        assert_eq!(resumed.data().eixo1.linha_vida.len(), 4);
    }

    #[test]
    fn remove_etapa_out_of_range_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);

        s.remove_etapa(10);
        assert_eq!(s.data().eixo1.linha_vida.len(), 3);

        s.remove_etapa(0);
        assert_eq!(s.data().eixo1.linha_vida.len(), 2);
    }

    #[test]
    fn reset_returns_to_seeded_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);

        s.set_participante(CampoParticipante::Nome, "Maria");
        s.reset();

        assert_eq!(*s.data(), AppData::default());
        assert_eq!(session(&dir).data(), &AppData::default());
    }

    #[tokio::test]
    async fn enviar_without_name_never_reaches_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let gw = gateway(&store);

        let mut s = session(&dir);
        s.enviar(&gw).await;

        assert!(matches!(s.status(), SessionStatus::Failed(_)));
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn enviar_success_and_failure_are_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let gw = gateway(&store);

        let mut s = session(&dir);
        s.set_participante(CampoParticipante::Nome, "Maria");

        s.enviar(&gw).await;
        assert!(matches!(s.status(), SessionStatus::Succeeded(_)));

        store.fail_response_writes();
        s.enviar(&gw).await;
        match s.status() {
            SessionStatus::Failed(message) => {
                assert!(message.contains("falha simulada"), "diagnostic kept: {message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sending_state_blocks_reentrant_submit() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let gw = gateway(&store);

        let mut s = session(&dir);
        s.set_participante(CampoParticipante::Nome, "Maria");

        // Force the busy state as if a send were outstanding.
        s.status = SessionStatus::Sending;
        s.enviar(&gw).await;

        assert_eq!(*s.status(), SessionStatus::Sending);
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
    }
}
