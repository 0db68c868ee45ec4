//! # Motor de Casamento
//!
//! Executa cada padrão de um reconhecedor sobre o texto inteiro e devolve os
//! candidatos brutos. Padrões do mesmo reconhecedor podem produzir candidatos
//! sobrepostos entre si (ex: um padrão genérico e um prefixado casando ambos
//! "EMP12345"); isso é resolvido mais tarde, não aqui.

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::recognizer::Recognizer;

/// Um casamento cru, antes de contexto e validação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    pub entity_type: EntityType,
    pub pattern: String,
    /// Offset de byte inicial (inclusivo)
    pub start: usize,
    /// Offset de byte final (exclusivo)
    pub end: usize,
    pub text: String,
    pub base_score: f64,
}

impl RawMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Candidato depois do contexto e da validação.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub raw: RawMatch,
    /// Score base + contexto, limitado a 1.0
    pub score: f64,
    /// Palavra-chave de contexto encontrada na janela
    pub keyword: Option<String>,
    pub validated: bool,
    pub normalized: Option<String>,
}

/// Todos os candidatos de `recognizer` em `text`, padrão por padrão, na ordem do catálogo.
///
/// Casamentos vazios são ignorados.
pub fn find_candidates(text: &str, recognizer: &Recognizer) -> Vec<RawMatch> {
    let mut candidates = Vec::new();
    for pattern in recognizer.patterns() {
        for (start, end) in pattern.find_spans(text) {
            if start >= end {
                continue;
            }
            candidates.push(RawMatch {
                entity_type: recognizer.entity_type(),
                pattern: pattern.name().to_string(),
                start,
                end,
                text: text[start..end].to_string(),
                base_score: pattern.base_score(),
            });
        }
    }
    candidates
}

/// Verifica se `[start, end)` é parte de um número decimal maior, ou seja,
/// vem logo depois de `<dígito>.` ou logo antes de `.<dígito>`.
///
/// Ex: em "1.123456789" ou "123456789.5" os nove dígitos não são um identificador.
pub fn embedded_in_number(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before = start >= 2 && bytes[start - 1] == b'.' && bytes[start - 2].is_ascii_digit();
    let after = end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit();
    before || after
}
