//! # Reconhecedor
//!
//! Junta, para um tipo de entidade, os padrões, o realce por contexto e o
//! validador em uma unidade endereçável. Não existe hierarquia de tipos: um
//! novo tipo de entidade é só mais uma entrada no registro.

use std::fmt;

use crate::config::{ContextConfig, RecognizerConfig};
use crate::context::ContextEnhancer;
use crate::entity::EntityType;
use crate::error::{check_unit_interval, ConfigError, ConfigResult};
use crate::pattern::Pattern;
use crate::validator::{builtin_validator, Validator};

pub struct Recognizer {
    entity: EntityType,
    patterns: Vec<Pattern>,
    context: ContextEnhancer,
    validator: Option<Box<dyn Validator>>,
    min_score: f64,
    reject_embedded_in_number: bool,
}

impl Recognizer {
    /// Reconhecedor sem contexto nem validador.
    pub fn new(entity: EntityType, patterns: Vec<Pattern>) -> ConfigResult<Self> {
        if patterns.is_empty() {
            return Err(ConfigError::NoPatterns { entity });
        }
        Ok(Self {
            entity,
            patterns,
            context: ContextEnhancer::new(
                entity,
                std::iter::empty::<&str>(),
                crate::config::DEFAULT_WINDOW,
                crate::config::DEFAULT_BOOST,
            )?,
            validator: None,
            min_score: 0.0,
            reject_embedded_in_number: embedded_guard_default(entity),
        })
    }

    /// Monta o reconhecedor a partir da configuração, já com os padrões compilados.
    pub fn from_config(
        config: &RecognizerConfig,
        defaults: &ContextConfig,
        patterns: Vec<Pattern>,
    ) -> ConfigResult<Self> {
        let entity = config.entity_type;
        let context = ContextEnhancer::new(
            entity,
            &config.context,
            config.window.unwrap_or(defaults.window),
            config.boost.unwrap_or(defaults.boost),
        )?;
        let validator = if config.validate {
            builtin_validator(entity, config.denylist.as_deref())
        } else {
            None
        };

        let recognizer = Self::new(entity, patterns)?
            .with_context(context)
            .with_min_score(config.min_score)?;
        Ok(Self {
            validator,
            reject_embedded_in_number: config
                .reject_embedded_in_number
                .unwrap_or_else(|| embedded_guard_default(entity)),
            ..recognizer
        })
    }

    pub fn with_context(mut self, context: ContextEnhancer) -> Self {
        self.context = context;
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> ConfigResult<Self> {
        if !check_unit_interval(min_score) {
            return Err(ConfigError::ThresholdOutOfRange {
                entity: self.entity,
                min_score,
            });
        }
        self.min_score = min_score;
        Ok(self)
    }

    pub fn with_embedded_number_guard(mut self, enabled: bool) -> Self {
        self.reject_embedded_in_number = enabled;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn context(&self) -> &ContextEnhancer {
        &self.context
    }

    pub fn validator(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn rejects_embedded_in_number(&self) -> bool {
        self.reject_embedded_in_number
    }
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recognizer")
            .field("entity", &self.entity)
            .field("patterns", &self.patterns)
            .field("context", &self.context)
            .field("validator", &self.validator.is_some())
            .field("min_score", &self.min_score)
            .field("reject_embedded_in_number", &self.reject_embedded_in_number)
            .finish()
    }
}

/// Tipos puramente numéricos não devem casar dentro de "1.123456789".
fn embedded_guard_default(entity: EntityType) -> bool {
    matches!(entity, EntityType::BusinessTaxId | EntityType::VaClaimNumber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternConfig;
    use crate::library::PatternLibrary;
    use crate::validator::VaClaimNumberValidator;

    fn ein_patterns() -> Vec<Pattern> {
        vec![Pattern::new("EIN_WITH_HYPHEN", r"\b\d{2}-\d{7}\b", 0.8).unwrap()]
    }

    #[test]
    fn test_new_defaults() {
        let rec = Recognizer::new(EntityType::BusinessTaxId, ein_patterns()).unwrap();
        assert!(rec.context().keywords().is_empty());
        assert!(rec.validator().is_none());
        assert_eq!(rec.min_score(), 0.0);
        assert!(rec.rejects_embedded_in_number());
    }

    #[test]
    fn test_no_patterns_rejected() {
        assert!(matches!(
            Recognizer::new(EntityType::DodId, vec![]),
            Err(ConfigError::NoPatterns { entity: EntityType::DodId })
        ));
    }

    #[test]
    fn test_from_config_wires_validator() {
        let config = RecognizerConfig::new(
            EntityType::VaClaimNumber,
            vec![PatternConfig::new("NINE", r"\b\d{9}\b", 0.85)],
        )
        .with_context(["claim number"]);
        let library = PatternLibrary::from_configs(std::slice::from_ref(&config)).unwrap();
        let patterns = library.patterns(EntityType::VaClaimNumber).to_vec();
        let rec = Recognizer::from_config(&config, &ContextConfig::default(), patterns).unwrap();

        assert!(rec.validator().is_some());
        assert_eq!(rec.context().keywords(), ["claim number"]);
        assert_eq!(rec.context().boost(), 0.4);

        let mut disabled = config.clone();
        disabled.validate = false;
        let patterns = library.patterns(EntityType::VaClaimNumber).to_vec();
        let rec = Recognizer::from_config(&disabled, &ContextConfig::default(), patterns).unwrap();
        assert!(rec.validator().is_none());
    }

    #[test]
    fn test_invalid_threshold() {
        let rec = Recognizer::new(EntityType::BusinessTaxId, ein_patterns()).unwrap();
        assert!(matches!(
            rec.with_min_score(-0.1),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_builder_chain() {
        let rec = Recognizer::new(EntityType::VaClaimNumber, ein_patterns())
            .unwrap()
            .with_validator(VaClaimNumberValidator::new())
            .with_embedded_number_guard(false);
        assert!(rec.validator().is_some());
        assert!(!rec.rejects_embedded_in_number());
    }
}
