//! # Erros de Configuração
//!
//! O único erro real do sistema acontece na **construção** do registro:
//! regex malformada, score fora de [0,1], lista de palavras-chave inválida.
//! Uma vez construído, o registro nunca falha durante o reconhecimento —
//! rejeições de validação são resultados esperados ([`crate::validator::Rejection`]),
//! não erros.

use thiserror::Error;

use crate::entity::EntityType;

/// Erro fatal de inicialização do registro.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("padrão '{pattern}' não compila: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("padrão '{pattern}' tem score {score} fora do intervalo [0, 1]")]
    ScoreOutOfRange { pattern: String, score: f64 },

    #[error("padrão sem nome em {entity}")]
    UnnamedPattern { entity: EntityType },

    #[error("padrão '{pattern}' duplicado em {entity}")]
    DuplicatePattern { entity: EntityType, pattern: String },

    #[error("{entity} não possui nenhum padrão")]
    NoPatterns { entity: EntityType },

    #[error("{entity} registrado mais de uma vez")]
    DuplicateRecognizer { entity: EntityType },

    #[error("palavra-chave vazia na lista de contexto de {entity}")]
    BlankKeyword { entity: EntityType },

    #[error("boost de contexto {boost} fora do intervalo [0, 1] em {entity}")]
    BoostOutOfRange { entity: EntityType, boost: f64 },

    #[error("janela de contexto não pode ser zero em {entity}")]
    EmptyWindow { entity: EntityType },

    #[error("score mínimo {min_score} fora do intervalo [0, 1] em {entity}")]
    ThresholdOutOfRange { entity: EntityType, min_score: f64 },

    #[error("arquivo de configuração inválido: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("falha ao ler configuração: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Garante que um score está em [0, 1] (NaN também é rejeitado).
pub(crate) fn check_unit_interval(score: f64) -> bool {
    score.is_finite() && (0.0..=1.0).contains(&score)
}
