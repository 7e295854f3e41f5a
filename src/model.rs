//! # Workbook Documents
//!
//! Typed shapes for the AFROLUMI workbook.
//!
//! The wire format is camelCase JSON and keeps the Portuguese field names the
//! deployed frontend already sends (`linhaVida`, `cartaGratidao`,
//! `mapaIdentidade`), so existing clients keep working unchanged.
//!
//! Axis payloads are a tagged union ([`AxisDocument`]) rather than an
//! open-ended map. Only Eixo 1 (Consciência) has tooling today; adding an
//! axis means adding a variant, and the gateway rejects anything it cannot
//! deserialize into a known shape.

use serde::{Deserialize, Serialize};

/// One entry of the life timeline exercise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinhaVidaEtapa {
    pub fase: String,
    pub acontecimento: String,
    pub sentimento: String,
}

impl LinhaVidaEtapa {
    pub fn nova(fase: &str) -> Self {
        Self {
            fase: fase.to_string(),
            ..Self::default()
        }
    }
}

/// The identity map exercise: five named free-text fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapaIdentidade {
    pub valores: String,
    pub talentos: String,
    pub conquistas: String,
    pub dores: String,
    pub sonhos: String,
}

/// Everything the participant fills in for Axis 1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eixo1 {
    pub linha_vida: Vec<LinhaVidaEtapa>,
    pub mapa_identidade: MapaIdentidade,
    pub carta_gratidao: String,
}

/// Identity fields for the person filling the workbook. `nome` is the only
/// stable key against the remote store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Participante {
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
}

/// The full draft document held in memory and mirrored to local storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub participante: Participante,
    pub eixo1: Eixo1,
}

impl Default for AppData {
    /// The seeded blank workbook: three life phases already named so the
    /// participant starts from a guided structure, everything else empty.
    fn default() -> Self {
        Self {
            participante: Participante::default(),
            eixo1: Eixo1 {
                linha_vida: vec![
                    LinhaVidaEtapa::nova("Infância"),
                    LinhaVidaEtapa::nova("Juventude"),
                    LinhaVidaEtapa::nova("Vida adulta"),
                ],
                mapa_identidade: MapaIdentidade::default(),
                carta_gratidao: String::new(),
            },
        }
    }
}

/// One axis worth of responses, tagged by which axis it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", content = "dados", rename_all = "camelCase")]
pub enum AxisDocument {
    Eixo1(Eixo1),
}

impl AxisDocument {
    /// Stable key of the axis, used by stores to route the document to the
    /// right table and to enforce one response per (participant, axis).
    pub fn axis_key(&self) -> &'static str {
        match self {
            AxisDocument::Eixo1(_) => "eixo1",
        }
    }
}
