//! Interface de linha de comando do vecart baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (generate, download)
//! e flags globais (--effect, --max-polls, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// vecart — Cliente do pipeline de efeitos de imagem por IA.
#[derive(Debug, Parser)]
#[command(name = "vecart", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Efeito de transformação a usar nesta sessão.
    #[arg(long, global = true)]
    pub effect: Option<String>,

    /// Número máximo de consultas de status antes do timeout.
    #[arg(long, global = true)]
    pub max_polls: Option<u32>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Envia uma imagem, gera o efeito e baixa o resultado.
    Generate {
        /// Caminho da imagem de entrada.
        image: PathBuf,

        /// Diretório onde salvar o resultado (padrão: diretório atual).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Gera sem baixar o resultado.
        #[arg(long, default_value_t = false)]
        no_download: bool,
    },

    /// Baixa um resultado já gerado a partir da sua URL.
    Download {
        /// URL do resultado.
        url: String,

        /// Diretório onde salvar o resultado (padrão: diretório atual).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
