//! # Registro de Reconhecedores — Orquestrador com Eventos Observáveis
//!
//! O registro é o único componente que o mundo externo chama. Ele é construído
//! uma vez, nunca muda, e pode ser compartilhado (`Arc`) entre quantas chamadas
//! concorrentes forem necessárias: nenhum estado mutável existe durante uma
//! chamada.
//!
//! ## Fluxo de uma chamada
//! 1. **Casamento**: cada reconhecedor habilitado roda seus padrões (em paralelo via Rayon).
//! 2. **Contexto**: cada candidato recebe o realce das palavras-chave próximas.
//! 3. **Filtragem**: guarda de número decimal, score mínimo e validador semântico.
//! 4. **Resolução**: sobreposições são resolvidas em anotações finais.
//!
//! Como no pipeline de análise, cada passo emite um [`RecognitionEvent`] por um
//! canal `mpsc`, permitindo que o servidor WebSocket transmita o progresso.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::engine::{embedded_in_number, find_candidates, RawMatch, ScoredMatch};
use crate::entity::{Annotation, EntityType};
use crate::error::{ConfigError, ConfigResult};
use crate::library::PatternLibrary;
use crate::recognizer::Recognizer;
use crate::resolver::resolve;
use crate::validator::{Rejection, Validation, ValidationContext};

/// Eventos emitidos durante uma chamada de reconhecimento.
///
/// A ordem é determinística: reconhecedores na ordem do registro, candidatos na
/// ordem em que cada padrão os encontrou.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RecognitionEvent {
    /// **Passo 1**: um reconhecedor terminou de rodar seus padrões.
    CandidatesFound {
        entity_type: EntityType,
        count: usize,
    },
    /// **Passo 2**: um candidato passou por contexto e validação.
    CandidateScored {
        entity_type: EntityType,
        pattern: String,
        start: usize,
        end: usize,
        text: String,
        base_score: f64,
        score: f64,
        keyword: Option<String>,
    },
    /// **Passo 2 (alternativo)**: o candidato foi descartado antes da resolução.
    CandidateRejected {
        entity_type: EntityType,
        pattern: String,
        start: usize,
        end: usize,
        text: String,
        reason: String,
    },
    /// **Passo 3**: resolução de sobreposições concluída.
    Resolved { accepted: usize, discarded: usize },
    /// **Conclusão**: anotações finais e estatísticas.
    Done {
        annotations: Vec<Annotation>,
        total_candidates: usize,
        processing_ms: u64,
    },
}

/// Conjunto imutável de reconhecedores, um por tipo de entidade.
#[derive(Debug)]
pub struct Registry {
    recognizers: BTreeMap<EntityType, Recognizer>,
}

impl Registry {
    /// Registro a partir de reconhecedores já montados.
    pub fn new(recognizers: impl IntoIterator<Item = Recognizer>) -> ConfigResult<Self> {
        let mut map = BTreeMap::new();
        for recognizer in recognizers {
            let entity = recognizer.entity_type();
            if map.insert(entity, recognizer).is_some() {
                return Err(ConfigError::DuplicateRecognizer { entity });
            }
        }
        info!(recognizers = map.len(), "registro de reconhecedores construído");
        Ok(Self { recognizers: map })
    }

    /// Registro com o catálogo embutido dos sete tipos.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_config(&RegistryConfig::builtin())
    }

    pub fn from_config(config: &RegistryConfig) -> ConfigResult<Self> {
        let mut library = PatternLibrary::from_configs(&config.recognizers)?;
        let mut recognizers = Vec::new();
        for rc in config.recognizers.iter().filter(|rc| rc.enabled) {
            let patterns = library
                .take(rc.entity_type)
                .ok_or(ConfigError::NoPatterns { entity: rc.entity_type })?;
            recognizers.push(Recognizer::from_config(rc, &config.context, patterns)?);
        }
        Self::new(recognizers)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.recognizers.keys().copied()
    }

    pub fn recognizer(&self, entity: EntityType) -> Option<&Recognizer> {
        self.recognizers.get(&entity)
    }

    /// Reconhece entidades em `text` usando a data local de hoje.
    ///
    /// `enabled` restringe os tipos considerados; `None` usa todos os registrados.
    pub fn recognize(&self, text: &str, enabled: Option<&[EntityType]>) -> Vec<Annotation> {
        self.recognize_on(text, enabled, Local::now().date_naive())
    }

    /// Como [`Registry::recognize`], com a data corrente explícita.
    pub fn recognize_on(&self, text: &str, enabled: Option<&[EntityType]>, today: NaiveDate) -> Vec<Annotation> {
        let (tx, rx) = mpsc::channel();
        self.recognize_streaming(text, enabled, today, tx);

        let mut annotations = Vec::new();
        while let Ok(event) = rx.recv() {
            if let RecognitionEvent::Done { annotations: result, .. } = event {
                annotations = result;
            }
        }
        annotations
    }

    /// Executa o reconhecimento empurrando [`RecognitionEvent`]s pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `CandidatesFound` (um por reconhecedor).
    /// 2. `CandidateScored` / `CandidateRejected` (um por candidato).
    /// 3. `Resolved`.
    /// 4. `Done`.
    pub fn recognize_streaming(
        &self,
        text: &str,
        enabled: Option<&[EntityType]>,
        today: NaiveDate,
        tx: mpsc::Sender<RecognitionEvent>,
    ) {
        let start = Instant::now();

        let selected: Vec<&Recognizer> = self
            .recognizers
            .values()
            .filter(|r| enabled.map_or(true, |set| set.contains(&r.entity_type())))
            .collect();

        // === Passo 1: Casamento (reconhecedores são independentes) ===
        let per_recognizer: Vec<Vec<RawMatch>> = selected
            .par_iter()
            .map(|recognizer| find_candidates(text, recognizer))
            .collect();

        // === Passo 2: Contexto, guardas e validação ===
        let mut scored = Vec::new();
        let mut total_candidates = 0;
        for (recognizer, raws) in selected.iter().zip(per_recognizer) {
            let _ = tx.send(RecognitionEvent::CandidatesFound {
                entity_type: recognizer.entity_type(),
                count: raws.len(),
            });
            total_candidates += raws.len();

            for raw in raws {
                match score_candidate(text, recognizer, raw, today) {
                    Ok(candidate) => {
                        let _ = tx.send(RecognitionEvent::CandidateScored {
                            entity_type: candidate.raw.entity_type,
                            pattern: candidate.raw.pattern.clone(),
                            start: candidate.raw.start,
                            end: candidate.raw.end,
                            text: candidate.raw.text.clone(),
                            base_score: candidate.raw.base_score,
                            score: candidate.score,
                            keyword: candidate.keyword.clone(),
                        });
                        scored.push(candidate);
                    }
                    Err((raw, rejection)) => {
                        let _ = tx.send(RecognitionEvent::CandidateRejected {
                            entity_type: raw.entity_type,
                            pattern: raw.pattern,
                            start: raw.start,
                            end: raw.end,
                            text: raw.text,
                            reason: rejection.to_string(),
                        });
                    }
                }
            }
        }

        // === Passo 3: Resolução de sobreposições ===
        let resolution = resolve(scored);
        let _ = tx.send(RecognitionEvent::Resolved {
            accepted: resolution.annotations.len(),
            discarded: resolution.discarded,
        });

        debug!(
            recognizers = selected.len(),
            candidates = total_candidates,
            annotations = resolution.annotations.len(),
            "reconhecimento concluído"
        );

        let _ = tx.send(RecognitionEvent::Done {
            annotations: resolution.annotations,
            total_candidates,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }
}

/// Aplica contexto, guardas e validador a um candidato.
///
/// A rejeição devolve o candidato para que o evento possa descrevê-lo.
fn score_candidate(
    text: &str,
    recognizer: &Recognizer,
    raw: RawMatch,
    today: NaiveDate,
) -> Result<ScoredMatch, (RawMatch, Rejection)> {
    if recognizer.rejects_embedded_in_number() && embedded_in_number(text, raw.start, raw.end) {
        return Err((raw, Rejection::EmbeddedInNumber));
    }

    let context = recognizer.context();
    let keyword = context
        .find_keyword(text, raw.start, raw.end)
        .map(str::to_string);
    let score = context.enhance(raw.base_score, text, raw.start, raw.end);

    if score < recognizer.min_score() {
        return Err((raw, Rejection::BelowThreshold));
    }

    let normalized = match recognizer.validator() {
        Some(validator) => {
            let ctx = ValidationContext {
                pattern: &raw.pattern,
                today,
            };
            match validator.validate(&raw.text, &ctx) {
                Validation::Accept(normalized) => normalized,
                Validation::Reject(rejection) => return Err((raw, rejection)),
            }
        }
        None => None,
    };

    Ok(ScoredMatch {
        raw,
        score,
        keyword,
        validated: true,
        normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PatternConfig, RecognizerConfig};
    use crate::context::ContextEnhancer;
    use crate::pattern::Pattern;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn builtin() -> Registry {
        Registry::builtin().unwrap()
    }

    #[test]
    fn test_ein_with_context() {
        let text = "The company EIN is 12-3456789.";
        let result = builtin().recognize_on(text, Some(&[EntityType::BusinessTaxId]), today());
        assert_eq!(result.len(), 1);
        let a = &result[0];
        assert_eq!(a.entity_type, EntityType::BusinessTaxId);
        assert_eq!(&text[a.start..a.end], "12-3456789");
        assert_eq!(a.text, "12-3456789");
        assert!(a.score >= 0.8);
        assert_eq!(a.score, 1.0);
    }

    #[test]
    fn test_ein_without_context_keeps_base() {
        let text = "Reference 12-3456789 attached";
        let result = builtin().recognize_on(text, Some(&[EntityType::BusinessTaxId]), today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].score, 0.8);
    }

    #[test]
    fn test_prefixed_employee_id_outranks_generic() {
        let employee = Recognizer::new(
            EntityType::EmployeeId,
            vec![Pattern::new("EMPLOYEE_ID_PREFIXED", r"\bEMP-\d{4,10}\b", 0.5).unwrap()],
        )
        .unwrap()
        .with_context(ContextEnhancer::new(EntityType::EmployeeId, ["employee id"], 50, 0.4).unwrap());
        let generic = Recognizer::new(
            EntityType::ServiceNumber,
            vec![Pattern::new("GENERIC_ALNUM", r"\b[A-Z]{2,4}-?\d{4,10}\b", 0.6).unwrap()],
        )
        .unwrap();
        let registry = Registry::new([employee, generic]).unwrap();

        let text = "Employee ID: EMP-10492";
        let result = registry.recognize_on(text, None, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entity_type, EntityType::EmployeeId);
        assert_eq!(result[0].text, "EMP-10492");
        assert!((result[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_dob_normalized_and_validated() {
        let text = "Patient DOB: 21/05/1994, admitted 31/02/2000.";
        let result = builtin().recognize_on(text, Some(&[EntityType::DateOfBirth]), today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "21/05/1994");
        assert_eq!(result[0].normalized.as_deref(), Some("1994-05-21"));
        assert_eq!(result[0].score, 1.0);
    }

    #[test]
    fn test_future_dob_dropped() {
        let text = "born 2099-01-01";
        assert!(builtin().recognize_on(text, None, today()).is_empty());
    }

    #[test]
    fn test_va_claim_number() {
        let text = "VA claim number 321-54-9876 and dummy claim number 987-65-4321";
        let result = builtin().recognize_on(text, Some(&[EntityType::VaClaimNumber]), today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "321-54-9876");
        assert_eq!(result[0].normalized.as_deref(), Some("321549876"));
        assert_eq!(result[0].score, 1.0);
    }

    #[test]
    fn test_nine_digits_resolve_to_claim() {
        // EIN_NO_HYPHEN (0.6) e VA_CLAIM_CONTINUOUS (0.85) no mesmo span
        let text = "ref 482913765";
        let result = builtin().recognize_on(text, None, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entity_type, EntityType::VaClaimNumber);
    }

    #[test]
    fn test_context_flips_nine_digit_reading() {
        // Com contexto de EIN, 0.6 + 0.4 = 1.0 supera o VA sem contexto (0.85)
        let text = "IRS EIN 482913765";
        let result = builtin().recognize_on(text, None, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entity_type, EntityType::BusinessTaxId);
    }

    #[test]
    fn test_embedded_in_decimal_dropped() {
        let text = "ratio 0.482913765";
        assert!(builtin()
            .recognize_on(text, Some(&[EntityType::VaClaimNumber, EntityType::BusinessTaxId]), today())
            .is_empty());
    }

    #[test]
    fn test_mixed_document() {
        let text = "Dr. Ramos, medical license MD123456, DoD ID DOD-1234567890, \
                    staff id EMP-10492, born 1980-03-15.";
        let result = builtin().recognize_on(text, None, today());
        let found: Vec<(EntityType, &str)> = result.iter().map(|a| (a.entity_type, a.text.as_str())).collect();
        assert_eq!(
            found,
            vec![
                (EntityType::MedicalLicense, "MD123456"),
                (EntityType::DodId, "DOD-1234567890"),
                (EntityType::EmployeeId, "EMP-10492"),
                (EntityType::DateOfBirth, "1980-03-15"),
            ]
        );
    }

    #[test]
    fn test_enabled_filter() {
        let text = "DOD-1234567890 and MD123456";
        let result = builtin().recognize_on(text, Some(&[EntityType::MedicalLicense]), today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entity_type, EntityType::MedicalLicense);
        assert!(builtin().recognize_on(text, Some(&[]), today()).is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(builtin().recognize_on("", None, today()).is_empty());
        assert!(builtin().recognize("", None).is_empty());
    }

    #[test]
    fn test_min_score_threshold() {
        let mut config = RegistryConfig::builtin();
        for rc in &mut config.recognizers {
            rc.min_score = 0.7;
        }
        let registry = Registry::from_config(&config).unwrap();
        // SERVICE_NUMBER sem contexto fica em 0.5 e é descartado
        assert!(registry.recognize_on("code AB1234567", None, today()).is_empty());
        let kept = registry.recognize_on("army service id AB1234567", None, today());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity_type, EntityType::ServiceNumber);
    }

    #[test]
    fn test_validator_can_be_disabled() {
        let mut config = RegistryConfig::builtin();
        for rc in &mut config.recognizers {
            rc.validate = rc.entity_type != EntityType::VaClaimNumber;
        }
        let registry = Registry::from_config(&config).unwrap();
        let result = registry.recognize_on("claim number 987-65-4321", Some(&[EntityType::VaClaimNumber]), today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].normalized, None);
    }

    #[test]
    fn test_from_toml_config() {
        let config = RegistryConfig::from_toml_str(
            r#"
            [[recognizer]]
            entity_type = "EMPLOYEE_ID"
            context = ["badge"]
            boost = 0.3

            [[recognizer.patterns]]
            name = "BADGE"
            regex = '\bB-\d{6}\b'
            score = 0.6
            "#,
        )
        .unwrap();
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.entity_types().collect::<Vec<_>>(), vec![EntityType::EmployeeId]);
        let result = registry.recognize_on("badge B-123456", None, today());
        assert_eq!(result.len(), 1);
        assert!((result[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_recognizer() {
        let a = Recognizer::new(EntityType::DodId, vec![Pattern::new("A", r"\d", 0.5).unwrap()]).unwrap();
        let b = Recognizer::new(EntityType::DodId, vec![Pattern::new("B", r"\d", 0.5).unwrap()]).unwrap();
        assert!(matches!(
            Registry::new([a, b]),
            Err(ConfigError::DuplicateRecognizer { entity: EntityType::DodId })
        ));
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = RegistryConfig {
            recognizers: vec![RecognizerConfig::new(
                EntityType::DodId,
                vec![PatternConfig::new("DOD", r"\bDOD\d{8}\b", 2.0)],
            )],
            ..RegistryConfig::default()
        };
        assert!(matches!(
            Registry::from_config(&config),
            Err(ConfigError::ScoreOutOfRange { .. })
        ));
    }

    #[test]
    fn test_events_streaming() {
        let registry = builtin();
        let (tx, rx) = mpsc::channel();
        registry.recognize_streaming("claim number 000000000", None, today(), tx);
        let events: Vec<RecognitionEvent> = rx.try_iter().collect();

        assert!(matches!(&events[0], RecognitionEvent::CandidatesFound { .. }));
        assert!(events.iter().any(|e| matches!(
            e,
            RecognitionEvent::CandidateRejected { entity_type: EntityType::VaClaimNumber, .. }
        )));
        let found = events
            .iter()
            .filter(|e| matches!(e, RecognitionEvent::CandidatesFound { .. }))
            .count();
        assert_eq!(found, EntityType::ALL.len());
        assert!(
            matches!(events.last(), Some(RecognitionEvent::Done { .. })),
            "Último evento deve ser Done"
        );
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    proptest! {
        #[test]
        fn annotations_are_sorted_disjoint_and_faithful(
            words in prop::collection::vec(
                prop_oneof![
                    Just("EIN".to_string()),
                    Just("dob".to_string()),
                    Just("claim number".to_string()),
                    Just("employee id".to_string()),
                    "[0-9]{9}",
                    "[0-9]{2}-[0-9]{7}",
                    "[0-9]{3}-[0-9]{2}-[0-9]{4}",
                    "[0-9]{3} [0-9]{3} [0-9]{3}",
                    "(0[1-9]|1[0-9])/(0[1-9]|1[0-2])/(19[0-9]{2})",
                    "(EMP|HR|MD|DOD)-?[0-9]{4,11}",
                    "[A-Z]{1,3}[0-9]{6,10}",
                    "[a-zà-ú]{1,8}",
                ],
                0..25,
            )
        ) {
            let text = words.join(" ");
            let registry = builtin();
            let first = registry.recognize_on(&text, None, today());

            for a in &first {
                prop_assert!((0.0..=1.0).contains(&a.score));
                prop_assert_eq!(&text[a.start..a.end], a.text.as_str());
            }
            for pair in first.windows(2) {
                prop_assert!(pair[0].start < pair[1].start);
                prop_assert!(!pair[0].overlaps(&pair[1]));
            }

            let second = registry.recognize_on(&text, None, today());
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }

        #[test]
        fn arbitrary_text_never_panics(text in ".{0,200}") {
            let result = builtin().recognize_on(&text, None, today());
            for a in &result {
                prop_assert_eq!(&text[a.start..a.end], a.text.as_str());
            }
        }
    }
}
