//! # Configuração do Registro
//!
//! Toda a superfície configurável é fornecida **na construção** do registro,
//! nunca por chamada: padrões e scores base, palavras-chave de contexto,
//! tamanho da janela, boost, validadores e limiares.
//!
//! A configuração pode vir do catálogo embutido ([`RegistryConfig::builtin`]) ou
//! de um documento TOML:
//!
//! ```toml
//! [context]
//! window = 50
//! boost = 0.4
//!
//! [[recognizer]]
//! entity_type = "EMPLOYEE_ID"
//! context = ["employee id", "staff id"]
//!
//! [[recognizer.patterns]]
//! name = "EMPLOYEE_ID_PREFIXED"
//! regex = '\b(?:EMP|EID)[-_]?\d{4,10}\b'
//! score = 0.85
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::error::ConfigResult;
use crate::library;

/// Janela padrão (em caracteres) antes e depois do casamento.
pub const DEFAULT_WINDOW: usize = 50;
/// Incremento padrão quando uma palavra-chave aparece na janela.
pub const DEFAULT_BOOST: f64 = 0.4;
/// Score base de padrões declarados sem score.
pub const DEFAULT_PATTERN_SCORE: f64 = 0.5;

/// Configuração completa de um registro.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Valores de contexto herdados por todos os reconhecedores
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default, rename = "recognizer")]
    pub recognizers: Vec<RecognizerConfig>,
}

/// Parâmetros globais do realce por contexto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_boost")]
    pub boost: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            boost: DEFAULT_BOOST,
        }
    }
}

/// Um reconhecedor: tipo, padrões, contexto e validação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    pub entity_type: EntityType,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub patterns: Vec<PatternConfig>,
    /// Palavras-chave de contexto (comparação sem diferenciar maiúsculas)
    #[serde(default)]
    pub context: Vec<String>,
    /// Sobrescreve `context.window`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
    /// Sobrescreve `context.boost`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Liga o validador semântico embutido do tipo (se houver)
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Candidatos abaixo deste score ajustado são descartados
    #[serde(default)]
    pub min_score: f64,
    /// Descarta casamentos que fazem parte de um número decimal maior.
    /// Se ausente, usa o padrão do tipo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_embedded_in_number: Option<bool>,
    /// Sequências fictícias rejeitadas pelo validador de VA Claim Number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denylist: Option<Vec<String>>,
}

impl RecognizerConfig {
    /// Reconhecedor mínimo: só o tipo e os padrões, todo o resto no padrão.
    pub fn new(entity_type: EntityType, patterns: Vec<PatternConfig>) -> Self {
        Self {
            entity_type,
            enabled: true,
            patterns,
            context: Vec::new(),
            window: None,
            boost: None,
            validate: true,
            min_score: 0.0,
            reject_embedded_in_number: None,
            denylist: None,
        }
    }

    pub fn with_context<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// Um padrão declarado em configuração.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub name: String,
    pub regex: String,
    #[serde(default = "default_pattern_score")]
    pub score: f64,
}

impl PatternConfig {
    pub fn new(name: impl Into<String>, regex: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            regex: regex.into(),
            score,
        }
    }
}

impl RegistryConfig {
    /// O catálogo embutido com os sete tipos de entidade.
    pub fn builtin() -> Self {
        Self {
            context: ContextConfig::default(),
            recognizers: library::builtin_recognizers(),
        }
    }

    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Lê e parseia um arquivo TOML.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_boost() -> f64 {
    DEFAULT_BOOST
}

fn default_pattern_score() -> f64 {
    DEFAULT_PATTERN_SCORE
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_parse_minimal_toml() {
        let cfg = RegistryConfig::from_toml_str(
            r#"
            [[recognizer]]
            entity_type = "EMPLOYEE_ID"
            context = ["employee id"]

            [[recognizer.patterns]]
            name = "EMP"
            regex = '\bEMP-\d{5}\b'
            "#,
        )
        .unwrap();

        assert_eq!(cfg.context, ContextConfig::default());
        assert_eq!(cfg.recognizers.len(), 1);
        let rec = &cfg.recognizers[0];
        assert_eq!(rec.entity_type, EntityType::EmployeeId);
        assert!(rec.enabled);
        assert!(rec.validate);
        assert_eq!(rec.min_score, 0.0);
        // Sem score explícito: valor conservador
        assert_eq!(rec.patterns[0].score, DEFAULT_PATTERN_SCORE);
    }

    #[test]
    fn test_parse_overrides() {
        let cfg = RegistryConfig::from_toml_str(
            r#"
            [context]
            window = 20
            boost = 0.25

            [[recognizer]]
            entity_type = "VA_CLAIM_NUMBER"
            boost = 0.1
            validate = false
            min_score = 0.7
            denylist = ["111223333"]

            [[recognizer.patterns]]
            name = "NINE"
            regex = '\b\d{9}\b'
            score = 0.85
            "#,
        )
        .unwrap();

        assert_eq!(cfg.context.window, 20);
        assert_eq!(cfg.context.boost, 0.25);
        let rec = &cfg.recognizers[0];
        assert_eq!(rec.boost, Some(0.1));
        assert!(!rec.validate);
        assert_eq!(rec.min_score, 0.7);
        assert_eq!(rec.denylist.as_deref(), Some(&["111223333".to_string()][..]));
    }

    #[test]
    fn test_unknown_entity_type_is_parse_error() {
        let err = RegistryConfig::from_toml_str(
            r#"
            [[recognizer]]
            entity_type = "US_SSN"
            patterns = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RegistryConfig::load("/nao/existe/sensid.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_builtin_covers_all_types() {
        let cfg = RegistryConfig::builtin();
        for entity in EntityType::ALL {
            assert!(
                cfg.recognizers.iter().any(|r| r.entity_type == entity),
                "catálogo embutido sem {entity}"
            );
        }
    }

    #[test]
    fn test_builtin_survives_toml_roundtrip() {
        let cfg = RegistryConfig::builtin();
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(RegistryConfig::from_toml_str(&text).unwrap(), cfg);
    }
}
