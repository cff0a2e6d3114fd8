//! Configuração do vecart carregada a partir de `vecart.toml`.
//!
//! A struct [`VecartConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `VECART_USER_ID` tem precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::job::PollConfig;

/// Configuração de nível superior carregada de `vecart.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct VecartConfig {
    /// Identidade do chamador enviada ao serviço de geração.
    /// Injetada aqui; nunca embutida no código.
    #[serde(default)]
    pub user_id: String,

    /// Identificador de projeto usado na autorização de upload.
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Base da API de geração de efeitos.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base do serviço de autorização de upload.
    #[serde(default = "default_upload_auth_base_url")]
    pub upload_auth_base_url: String,

    /// Base pública de leitura dos objetos enviados.
    #[serde(default = "default_assets_base_url")]
    pub assets_base_url: String,

    /// Efeito de transformação aplicado pelo pipeline.
    #[serde(default = "default_effect_id")]
    pub effect_id: String,

    /// Intervalo fixo entre consultas de status, em milissegundos.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Número máximo de consultas de status antes do timeout.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

// Valor padrão para o projeto de upload.
fn default_project_id() -> String {
    "dressr".to_string()
}

fn default_api_base_url() -> String {
    "https://api.chromastudio.ai".to_string()
}

fn default_upload_auth_base_url() -> String {
    "https://core.faceswapper.ai".to_string()
}

fn default_assets_base_url() -> String {
    "https://assets.dressr.ai".to_string()
}

// Valor padrão para o efeito: arte vetorial a partir de foto.
fn default_effect_id() -> String {
    "photoToVectorArt".to_string()
}

// Valor padrão para o intervalo de polling: 2000ms.
fn default_poll_interval_ms() -> u64 {
    2000
}

// Valor padrão para o máximo de consultas: 60 (~120s de orçamento).
fn default_max_polls() -> u32 {
    60
}

impl Default for VecartConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            project_id: default_project_id(),
            api_base_url: default_api_base_url(),
            upload_auth_base_url: default_upload_auth_base_url(),
            assets_base_url: default_assets_base_url(),
            effect_id: default_effect_id(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
        }
    }
}

impl VecartConfig {
    /// Carrega a configuração de `vecart.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let path = Path::new("vecart.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<VecartConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração para a identidade.
        if let Ok(id) = std::env::var("VECART_USER_ID")
            && !id.is_empty()
        {
            config.user_id = id;
        }

        Ok(config)
    }

    /// Cadência de polling derivada da configuração.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval_ms: self.poll_interval_ms,
            max_polls: self.max_polls,
        }
    }
}
