//! # Padrões e Motor de Casamento
//!
//! Um [`Pattern`] é uma regra nomeada com um score base. O motor que executa a
//! regra é uma capacidade injetada ([`Matcher`]): qualquer implementação que,
//! dado um texto, devolva todas as ocorrências não sobrepostas com seus offsets
//! serve. Por padrão usamos `regex::Regex`.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{check_unit_interval, ConfigError, ConfigResult};

/// Capacidade de casamento: todas as ocorrências não sobrepostas de um padrão.
pub trait Matcher: Send + Sync {
    /// Retorna pares `(start, end)` em bytes, fim exclusivo, em ordem crescente.
    fn find_spans(&self, text: &str) -> Vec<(usize, usize)>;
}

impl Matcher for Regex {
    fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.find_iter(text).map(|m| (m.start(), m.end())).collect()
    }
}

/// Uma regra nomeada com score base em [0, 1].
///
/// Imutável depois de construída; pertence exclusivamente ao seu reconhecedor.
#[derive(Clone)]
pub struct Pattern {
    name: String,
    matcher: Arc<dyn Matcher>,
    base_score: f64,
}

impl Pattern {
    /// Compila `regex` e valida o score.
    pub fn new(name: impl Into<String>, regex: &str, base_score: f64) -> ConfigResult<Self> {
        let name = name.into();
        let compiled = Regex::new(regex).map_err(|source| ConfigError::InvalidPattern {
            pattern: name.clone(),
            source,
        })?;
        Self::with_matcher(name, Arc::new(compiled), base_score)
    }

    /// Usa um motor de casamento arbitrário no lugar de `regex`.
    pub fn with_matcher(
        name: impl Into<String>,
        matcher: Arc<dyn Matcher>,
        base_score: f64,
    ) -> ConfigResult<Self> {
        let name = name.into();
        if !check_unit_interval(base_score) {
            return Err(ConfigError::ScoreOutOfRange {
                pattern: name,
                score: base_score,
            });
        }
        Ok(Self {
            name,
            matcher,
            base_score,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.matcher.find_spans(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("base_score", &self.base_score)
            .finish_non_exhaustive()
    }
}
