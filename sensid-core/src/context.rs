//! # Realce por Contexto
//!
//! Um casamento puro de padrão é ambíguo: nove dígitos soltos podem ser um EIN,
//! um processo do VA ou um número de pedido. A presença de vocabulário do
//! domínio por perto ("tax id", "dob", "claim number") é a principal alavanca
//! de precisão.
//!
//! ## Algoritmo
//! 1. Recorta uma janela de `window` caracteres antes e depois do casamento
//!    (limitada às bordas do texto). O trecho casado não faz parte da janela.
//! 2. Procura, sem diferenciar maiúsculas, qualquer palavra-chave nos dois lados.
//!    A palavra-chave precisa estar isolada: "ein" não casa dentro de "being".
//! 3. Se achou, soma `boost` ao score base e limita o total em 1.0.
//!
//! O realce é aditivo e limitado, nunca multiplicativo: várias palavras-chave na
//! mesma janela valem o mesmo que uma.

use crate::entity::EntityType;
use crate::error::{check_unit_interval, ConfigError, ConfigResult};

#[derive(Debug, Clone)]
pub struct ContextEnhancer {
    /// Palavras-chave já em minúsculas, sem repetição
    keywords: Vec<String>,
    window: usize,
    boost: f64,
}

impl ContextEnhancer {
    pub fn new<I, S>(entity: EntityType, keywords: I, window: usize, boost: f64) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if window == 0 {
            return Err(ConfigError::EmptyWindow { entity });
        }
        if !check_unit_interval(boost) {
            return Err(ConfigError::BoostOutOfRange { entity, boost });
        }

        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() {
                return Err(ConfigError::BlankKeyword { entity });
            }
            if !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }

        Ok(Self {
            keywords: normalized,
            window,
            boost,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn boost(&self) -> f64 {
        self.boost
    }

    /// Primeira palavra-chave (na ordem configurada) presente na janela de `[start, end)`.
    pub fn find_keyword(&self, text: &str, start: usize, end: usize) -> Option<&str> {
        if self.keywords.is_empty() {
            return None;
        }
        let (left, right) = window_bounds(text, start, end, self.window);
        let before = text[left..start].to_lowercase();
        let after = text[end..right].to_lowercase();

        self.keywords
            .iter()
            .find(|kw| contains_keyword(&before, kw) || contains_keyword(&after, kw))
            .map(String::as_str)
    }

    /// Ajuste de confiança: `boost` se alguma palavra-chave estiver na janela, senão 0.
    pub fn score_context(&self, text: &str, start: usize, end: usize) -> f64 {
        if self.find_keyword(text, start, end).is_some() {
            self.boost
        } else {
            0.0
        }
    }

    /// Score base mais o ajuste de contexto, limitado a 1.0.
    pub fn enhance(&self, base_score: f64, text: &str, start: usize, end: usize) -> f64 {
        (base_score + self.score_context(text, start, end)).min(1.0)
    }
}

/// Offsets de byte `[left, right)` da janela, alinhados a fronteiras de caractere.
fn window_bounds(text: &str, start: usize, end: usize, window: usize) -> (usize, usize) {
    let left = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let right = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    (left, right)
}

/// Procura `keyword` em `haystack` exigindo que ela não esteja colada a letras
/// ou dígitos. Bordas não alfanuméricas da própria palavra-chave ("claim #")
/// dispensam a checagem daquele lado.
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let needs_left = keyword.chars().next().is_some_and(char::is_alphanumeric);
    let needs_right = keyword.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack.match_indices(keyword).any(|(pos, _)| {
        let left_ok = !needs_left
            || !haystack[..pos]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let right_ok = !needs_right
            || !haystack[pos + keyword.len()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        left_ok && right_ok
    })
}
