//! Tipos trocados entre o controlador de entrega e o transporte.
//!
//! [`WireBody`] é o payload já serializado no formato de fio; o transporte
//! não conhece o tipo original. [`TransportOutcome`] é a classificação em três
//! vias que o controlador traduz em gatilhos da máquina de estados.

use reqwest::StatusCode;
use serde::Serialize;

use super::error::TransportError;

/// Payload serializado, pronto para ser enviado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBody {
    /// Valor do cabeçalho `Content-Type` correspondente a `bytes`.
    pub content_type: &'static str,
    /// Conteúdo serializado.
    pub bytes: Vec<u8>,
}

impl WireBody {
    /// Serializa `payload` como JSON.
    pub fn json<P: Serialize>(payload: &P) -> Result<Self, serde_json::Error> {
        Ok(Self {
            content_type: "application/json",
            bytes: serde_json::to_vec(payload)?,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Resultado de uma tentativa de entrega.
#[derive(Debug)]
pub enum TransportOutcome {
    /// O serviço remoto aceitou o payload (2xx).
    Success,
    /// O serviço remoto recusou o payload de forma definitiva (status >= 400).
    HardFailure { status: u16 },
    /// Falha transitória: rede, timeout ou status inesperado.
    Error(TransportError),
}

impl TransportOutcome {
    /// Classifica um status HTTP final.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            TransportOutcome::Success
        } else if status.as_u16() >= 400 {
            TransportOutcome::HardFailure {
                status: status.as_u16(),
            }
        } else {
            TransportOutcome::Error(TransportError::UnexpectedStatus {
                status: status.as_u16(),
            })
        }
    }
}
