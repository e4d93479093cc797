//! Tipos de erro da camada de transporte.
//!
//! Define [`TransportError`] com as falhas que o controlador de entrega trata
//! como transitórias: todas viram um gatilho `Reject` e podem ser retentadas.
//! Respostas HTTP >= 400 não são erros de transporte; são classificadas como
//! [`TransportOutcome::HardFailure`](super::TransportOutcome::HardFailure).

use thiserror::Error;

/// Falhas transitórias ao entregar um payload.
///
/// - [`Timeout`](TransportError::Timeout) — a requisição excedeu o tempo limite
/// - [`UnexpectedStatus`](TransportError::UnexpectedStatus) — status que não é sucesso nem erro (1xx/3xx)
/// - [`Network`](TransportError::Network) — falha na camada de rede (DNS, conexão recusada)
/// - [`Simulated`](TransportError::Simulated) — falha produzida pelo transporte roteirizado
#[derive(Debug, Error)]
pub enum TransportError {
    /// A requisição excedeu o tempo limite configurado.
    #[error("request timed out")]
    Timeout,

    /// O servidor respondeu com um status que não indica sucesso nem falha definitiva.
    #[error("unexpected response status {status}")]
    UnexpectedStatus { status: u16 },

    /// Falha de rede subjacente, encapsulando o erro original do `reqwest`.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Falha injetada pelo [`ScriptedTransport`](super::ScriptedTransport).
    #[error("simulated failure: {0}")]
    Simulated(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err)
        }
    }
}
