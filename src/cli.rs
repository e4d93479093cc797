//! Interface de linha de comando do courier baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (send, demo)
//! e flags globais (--config, --max-retries, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// courier — entrega de payloads guiada por máquina de estados.
#[derive(Debug, Parser)]
#[command(name = "courier", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./courier.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Número máximo de retentativas em caso de falha de transporte.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Unidade do backoff linear em milissegundos.
    #[arg(long, global = true)]
    pub backoff_unit_ms: Option<u64>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Envia um arquivo para o serviço remoto.
    Send {
        /// Endpoint de destino; usa o da configuração se omitido.
        endpoint: Option<String>,

        /// Arquivo a ser entregue.
        #[arg(long)]
        file: PathBuf,
    },

    /// Executa a demonstração embutida da máquina de estados com um transporte simulado.
    Demo {
        /// Quantas falhas transitórias simular antes do resultado final.
        #[arg(long, default_value_t = 2)]
        failures: usize,

        /// Termina com uma recusa definitiva (HTTP 500) em vez de sucesso.
        #[arg(long, default_value_t = false)]
        hard_failure: bool,
    },
}
