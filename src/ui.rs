//! Interface de terminal do vecart — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O trait [`UiSink`] é o canal de notificações de
//! estado do pipeline; [`TerminalUi`] é o adaptador concreto de terminal.

use std::sync::Mutex;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::job::GenerationRecord;

/// Notificações de mudança de estado da UI, emitidas pelo orquestrador.
///
/// O núcleo do pipeline expõe métodos simples; quem liga eventos de
/// entrada (CLI, drag-and-drop, botões) a esses métodos é uma camada
/// adaptadora externa.
pub trait UiSink {
    /// Entra em estado ocupado, com o texto de status inicial.
    fn loading(&self, status: &str);
    /// Atualiza a linha de status legível durante o polling.
    fn status(&self, text: &str);
    /// Uma pré-visualização do arquivo enviado está disponível.
    fn preview(&self, url: &str);
    /// O upload terminou; o pipeline está pronto para gerar.
    fn ready(&self);
    /// Um resultado final está disponível.
    fn result(&self, url: &str);
    /// Instruções explícitas para o usuário (fallback manual, pré-requisitos).
    fn guidance(&self, message: &str);
    /// Falha visível ao usuário, já em forma de mensagem única.
    fn error(&self, message: &str);
    /// Retorna ao estado ocioso; indicadores de ocupado são limpos.
    fn idle(&self);
}

/// Adaptador de terminal: spinner animado durante o processamento e
/// mensagens coloridas para sucesso (verde), falha (vermelho) e
/// orientação (amarelo).
pub struct TerminalUi {
    // Spinner ativo, se houver. Mutex porque o sink é compartilhado por referência.
    spinner: Mutex<Option<ProgressBar>>,
    green: Style,
    red: Style,
    yellow: Style,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    fn finish_spinner(&self) {
        if let Some(pb) = self.spinner.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        let guard = self.spinner.lock().unwrap();
        match guard.as_ref() {
            // Imprime acima do spinner sem quebrar a animação.
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }

    /// Imprime o registro de geração formatado em JSON com estilo colorido.
    pub fn print_record(&self, record: &GenerationRecord) {
        println!();
        println!("{}", self.green.apply_to("─── Generation Record ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSink for TerminalUi {
    fn loading(&self, status: &str) {
        let mut guard = self.spinner.lock().unwrap();
        let pb = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .expect("invalid template"),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        });
        pb.set_message(status.to_string());
    }

    fn status(&self, text: &str) {
        let guard = self.spinner.lock().unwrap();
        match guard.as_ref() {
            Some(pb) => pb.set_message(text.to_string()),
            None => println!("{text}"),
        }
    }

    fn preview(&self, url: &str) {
        self.println(format!("  {} Uploaded: {url}", self.green.apply_to("✓")));
    }

    fn ready(&self) {
        self.finish_spinner();
        println!("  {} READY", self.green.apply_to("✓"));
    }

    fn result(&self, url: &str) {
        self.finish_spinner();
        println!("  {} Result ready: {url}", self.green.apply_to("✓"));
    }

    fn guidance(&self, message: &str) {
        self.println(format!("  {} {message}", self.yellow.apply_to("⚠")));
    }

    fn error(&self, message: &str) {
        self.finish_spinner();
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }

    fn idle(&self) {
        self.finish_spinner();
    }
}

#[cfg(test)]
pub use recording::{RecordingSink, UiEvent};
