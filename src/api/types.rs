//! Tipos de dados para requisições e respostas da API de efeitos de imagem.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme o formato esperado pelo endpoint `image-gen` do serviço remoto.
//! Os campos usam camelCase no JSON via `serde(rename_all)`.

use serde::{Deserialize, Serialize};

/// Corpo da requisição de submissão de job para o endpoint `image-gen`.
///
/// Os campos `model` e `tool_type` são constantes do pipeline; `effect_id`
/// e `user_id` são injetados a partir da configuração.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Identificador do modelo ("image-effects").
    pub model: String,
    /// Tipo de ferramenta ("image-effects").
    pub tool_type: String,
    /// Identificador do efeito de transformação (ex.: "photoToVectorArt").
    pub effect_id: String,
    /// URL pública da imagem previamente enviada ao armazenamento.
    pub image_url: String,
    /// Identidade do chamador, fornecida por um colaborador externo de auth.
    pub user_id: String,
    /// Remove a marca d'água do resultado. Fixo em `true` neste pipeline.
    pub remove_watermark: bool,
    /// Marca o job como privado. Fixo em `true` neste pipeline.
    pub is_private: bool,
}

/// Identificador do job retornado pela submissão.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    /// Id opaco do job, usado nas consultas de status.
    pub job_id: String,
}

/// Status de um job conforme reportado pelo servidor.
///
/// Valores não reconhecidos caem em [`Unknown`](RemoteStatus::Unknown) e são
/// tratados como "ainda em andamento" pelo poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Error,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus {
    /// `completed`, `failed` e `error` encerram o polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }
}

/// Resposta do endpoint de status de job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Status atual do job.
    pub status: RemoteStatus,
    /// Payload de resultado, presente apenas quando o job é concluído.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultPayload>,
    /// Mensagem de erro fornecida pelo servidor em caso de falha.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload de resultado em uma das duas formas observadas na API:
/// um objeto direto ou uma sequência de objetos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultPayload {
    One(ResultItem),
    Many(Vec<ResultItem>),
}

/// Um item de resultado — carrega a localização da saída em um de três
/// campos possíveis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    /// URL de mídia (campo preferencial, esquema mais novo).
    #[serde(default)]
    pub media_url: Option<String>,
    /// URL de imagem (esquema antigo).
    #[serde(default)]
    pub image: Option<String>,
    /// URL de vídeo (esquema antigo).
    #[serde(default)]
    pub video: Option<String>,
}
