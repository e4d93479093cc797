//! Configuração do courier carregada a partir de `courier.toml`.
//!
//! A struct [`CourierConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `COURIER_ENDPOINT` tem precedência sobre o arquivo.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::delivery::RetryPolicy;
use crate::error::CourierError;

/// Nome do arquivo procurado no diretório atual quando `--config` não é informado.
pub const DEFAULT_CONFIG_FILE: &str = "courier.toml";

/// Configuração de nível superior carregada de `courier.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CourierConfig {
    /// Endpoint padrão para onde os payloads são enviados.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Retentativas antes de uma falha de transporte se tornar definitiva.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Unidade em milissegundos do backoff linear.
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Tempo limite para estabelecer a conexão, em segundos.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Tempo limite total de cada requisição, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Valor padrão para o endpoint: serviço local.
fn default_endpoint() -> String {
    "http://localhost:8080/deliveries".to_string()
}

// Valor padrão para retentativas máximas: 5.
fn default_max_retries() -> u32 {
    5
}

// Valor padrão para a unidade de backoff: 1000ms.
fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_retries: default_max_retries(),
            backoff_unit_ms: default_backoff_unit_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CourierConfig {
    /// Carrega a configuração de `path`, ou de `courier.toml` no diretório atual.
    /// Usa valores padrão se o arquivo padrão não existir; um `path` explícito
    /// inexistente é erro.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(endpoint) = std::env::var("COURIER_ENDPOINT")
            && !endpoint.is_empty()
        {
            config.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, CourierError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<CourierConfig>(&contents)?)
    }

    /// Rejeita combinações que impediriam qualquer entrega.
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.endpoint.trim().is_empty() {
            return Err(CourierError::Config("endpoint must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CourierError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_unit_ms: self.backoff_unit_ms,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_values() {
        let config = CourierConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8080/deliveries");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.backoff_unit_ms, 1000);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            endpoint = "https://files.example.com/upload"
            max_retries = 3
        "#;
        let config: CourierConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint, "https://files.example.com/upload");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_unit_ms, 1000);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy {
                max_retries: 3,
                backoff_unit_ms: 1000
            }
        );
    }

    #[test]
    fn load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backoff_unit_ms = 250").unwrap();
        writeln!(file, "request_timeout_secs = 5").unwrap();

        let config = CourierConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.backoff_unit_ms, 250);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CourierConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_retries = \"many\"").unwrap();
        assert!(CourierConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn validate_rejects_empty_endpoint() {
        let config = CourierConfig {
            endpoint: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CourierError::Config(_))));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        // No ambiente de teste, tipicamente não há courier.toml no diretório de trabalho.
        let config = CourierConfig::load(None).unwrap();
        assert_eq!(config.max_retries, 5);
    }
}
