//! # Resolução de Sobreposições
//!
//! Candidatos de reconhecedores e padrões diferentes podem cobrir o mesmo
//! trecho ("123456789" é tanto EIN quanto VA Claim Number). A resolução reduz
//! tudo a um conjunto de anotações que não se sobrepõem.
//!
//! ## Algoritmo (agendamento guloso de intervalos)
//! 1. Ordena os candidatos por score (desc), tamanho do span (desc) e início (asc).
//!    Empates restantes caem no tipo de entidade e no nome do padrão, o que
//!    torna a ordem total e o resultado independente da ordem de descoberta.
//! 2. Percorre nessa ordem aceitando um candidato só se ele não cruzar nenhum
//!    já aceito.
//! 3. Reordena as aceitas por início para apresentação.
//!
//! É o equivalente a um NMS (Non-Maximum Suppression) sobre spans: a leitura
//! mais confiante e mais específica de cada região ambígua vence.

use std::cmp::Ordering;

use crate::engine::ScoredMatch;
use crate::entity::{spans_overlap, Annotation};

/// Ordem de prioridade entre dois candidatos (o "menor" vence).
fn priority(a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.raw.len().cmp(&a.raw.len()))
        .then_with(|| a.raw.start.cmp(&b.raw.start))
        .then_with(|| a.raw.entity_type.cmp(&b.raw.entity_type))
        .then_with(|| a.raw.pattern.cmp(&b.raw.pattern))
}

/// Resultado da resolução: anotações aceitas e quantos candidatos perderam.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub annotations: Vec<Annotation>,
    pub discarded: usize,
}

/// Reduz candidatos validados a anotações sem sobreposição, ordenadas por início.
///
/// Candidatos com `validated == false` são ignorados.
pub fn resolve(mut candidates: Vec<ScoredMatch>) -> Resolution {
    candidates.retain(|c| c.validated);
    candidates.sort_by(priority);

    let total = candidates.len();
    let mut accepted: Vec<ScoredMatch> = Vec::with_capacity(total);
    for candidate in candidates {
        let span = (candidate.raw.start, candidate.raw.end);
        if accepted
            .iter()
            .any(|a| spans_overlap(span, (a.raw.start, a.raw.end)))
        {
            continue;
        }
        accepted.push(candidate);
    }

    accepted.sort_by_key(|a| a.raw.start);
    let discarded = total - accepted.len();
    let annotations = accepted
        .into_iter()
        .map(|m| Annotation {
            entity_type: m.raw.entity_type,
            start: m.raw.start,
            end: m.raw.end,
            text: m.raw.text,
            score: m.score,
            normalized: m.normalized,
        })
        .collect();

    Resolution {
        annotations,
        discarded,
    }
}
