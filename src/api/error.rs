//! Tipos de erro para o cliente da API de efeitos de imagem.
//!
//! Define [`ApiError`] com variantes para erros da API e erros de rede.
//! Usa `thiserror` para derivar `Display` e `Error` automaticamente a partir
//! dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API de efeitos.
///
/// As variantes cobrem os dois cenários de falha do transporte:
/// - [`Api`](ApiError::Api) — o servidor respondeu com status não-sucesso
/// - [`Network`](ApiError::Network) — falha na camada de rede
#[derive(Debug, Error)]
pub enum ApiError {
    /// Erro retornado pela API (ex.: 400 requisição inválida, 500 erro interno).
    /// Contém o código de status HTTP e a mensagem de erro do corpo da resposta.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
