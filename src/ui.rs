//! Interface de terminal do courier — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`DeliveryProgress`] é um [`Observer`] que
//! acompanha visualmente uma entrega no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::delivery::{DeliveryReport, State};
use crate::observer::{DeliveryEvent, Observer, Phase};

/// Indicador visual de progresso para uma entrega no terminal.
///
/// Exibe um spinner animado durante o envio e mensagens
/// coloridas para sucesso (verde), falha (vermelho) e retentativa (amarelo).
pub struct DeliveryProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
    // Estilo amarelo para mensagens de retentativa.
    yellow: Style,
    // Retentativas máximas, exibidas junto a cada retentativa.
    max_retries: u32,
}

impl DeliveryProgress {
    /// Inicia o spinner com o nome do arquivo e retorna a instância de progresso.
    pub fn start(name: &str, max_retries: u32) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{}: {name}", State::Accepted));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            max_retries,
        }
    }

    /// Imprime o relatório de entrega formatado em JSON com estilo colorido.
    pub fn print_report(&self, report: &DeliveryReport) {
        self.pb.finish_and_clear();
        let status_style = match report.final_state {
            State::Completed => &self.green,
            State::Failed => &self.red,
            _ => &self.yellow,
        };
        println!();
        println!("{}", status_style.apply_to("─── Delivery Report ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }
}

impl Observer for DeliveryProgress {
    fn on_event(&self, event: &DeliveryEvent) {
        match event {
            DeliveryEvent::Lifecycle {
                phase: Phase::Entering,
                state,
            } => self.pb.set_message(format!("{state}")),
            DeliveryEvent::Lifecycle { .. } => {}
            DeliveryEvent::Attempt { endpoint, .. } => {
                self.pb.set_message(format!("{}: {endpoint}", State::Pending));
            }
            DeliveryEvent::Backoff { retry, delay } => {
                self.pb.set_message(format!(
                    "{}: waiting {}ms before retry {retry}",
                    State::Pending,
                    delay.as_millis()
                ));
            }
            DeliveryEvent::Rejected { retry, error } if *retry > self.max_retries => {
                self.pb.println(format!(
                    "  {} Giving up: {error}",
                    self.red.apply_to("✗")
                ));
            }
            DeliveryEvent::Rejected { retry, error } => {
                self.pb.println(format!(
                    "  {} Retry {retry}/{}: {error}",
                    self.yellow.apply_to("↻"),
                    self.max_retries
                ));
            }
            DeliveryEvent::Refused { status, .. } => {
                self.pb.println(format!(
                    "  {} Refused with status {status}",
                    self.red.apply_to("✗")
                ));
            }
            DeliveryEvent::Completed { retries } => {
                self.pb.println(format!(
                    "  {} Delivered after {retries} retries",
                    self.green.apply_to("✓")
                ));
            }
            DeliveryEvent::Failed { retries } => {
                self.pb.println(format!(
                    "  {} Delivery failed after {retries} retries",
                    self.red.apply_to("✗")
                ));
            }
        }
    }
}
