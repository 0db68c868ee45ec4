//! # Biblioteca de Padrões
//!
//! Catálogo imutável `tipo de entidade → lista ordenada de padrões`. Contém o
//! catálogo embutido (regex, scores base e palavras-chave de cada tipo) e a
//! compilação desse catálogo (ou de um vindo de configuração) em [`Pattern`]s.
//!
//! ## Por que vários padrões por tipo?
//!
//! Um mesmo identificador aparece em formatos diferentes ("123-45-6789",
//! "123 456 789", "123456789"). Cada formato é um padrão independente com seu
//! próprio score: formatos mais específicos merecem mais confiança que um
//! número solto de 9 dígitos, que pode ser muita coisa.

use std::collections::{BTreeMap, HashSet};

use crate::config::{PatternConfig, RecognizerConfig};
use crate::entity::EntityType;
use crate::error::{ConfigError, ConfigResult};
use crate::pattern::Pattern;

struct CatalogEntry {
    entity: EntityType,
    patterns: &'static [(&'static str, &'static str, f64)],
    keywords: &'static [&'static str],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        entity: EntityType::BusinessTaxId,
        patterns: &[
            ("EIN_WITH_HYPHEN", r"\b\d{2}-\d{7}\b", 0.8),
            ("EIN_NO_HYPHEN", r"\b\d{9}\b", 0.6),
        ],
        keywords: &[
            "ein",
            "tax id",
            "tax identification",
            "business tax",
            "practice tax",
            "employer identification",
            "irs",
        ],
    },
    CatalogEntry {
        entity: EntityType::DodId,
        patterns: &[("DOD_ID", r"(?i)\bDOD[-\s]?\d{8,12}\b", 0.95)],
        keywords: &[
            "dod id",
            "department of defense",
            "military id",
            "dod number",
            "dod",
        ],
    },
    CatalogEntry {
        entity: EntityType::DateOfBirth,
        patterns: &[
            (
                "DOB_DDMMYYYY",
                r"\b(0[1-9]|[12][0-9]|3[01])[-/.](0[1-9]|1[0-2])[-/.]([12][0-9]{3})\b",
                0.85,
            ),
            (
                "DOB_YYYYMMDD",
                r"\b([12][0-9]{3})[-/.](0[1-9]|1[0-2])[-/.](0[1-9]|[12][0-9]|3[01])\b",
                0.85,
            ),
        ],
        keywords: &[
            "date of birth",
            "dob",
            "born",
            "birth",
            "birthdate",
            "birthday",
        ],
    },
    CatalogEntry {
        entity: EntityType::ServiceNumber,
        patterns: &[
            ("SERVICE_NUMBER", r"\b[A-Z]{1,3}\d{6,10}\b", 0.5),
            ("SERVICE_NUMBER_SEPARATED", r"\b[A-Z]{1,3}[-\s]?\d{6,10}\b", 0.5),
        ],
        keywords: &[
            "service",
            "number",
            "service-number",
            "military",
            "army",
            "navy",
            "airforce",
            "defense",
            "service id",
        ],
    },
    CatalogEntry {
        entity: EntityType::EmployeeId,
        patterns: &[
            (
                "EMPLOYEE_ID_PREFIXED",
                r"\b(?:EMP|EID|STAFF|HR)[-_]?\d{4,10}\b",
                0.85,
            ),
            ("EMPLOYEE_ID_GENERIC", r"\b[A-Z]{2,4}\d{4,10}\b", 0.5),
            ("EMPLOYEE_ID_SHORT", r"\b[a-z]{2}-[0-9]{4}\b", 0.5),
        ],
        keywords: &[
            "employee id",
            "employee code",
            "staff id",
            "staff code",
            "employee number",
            "staff number",
            "hr id",
            "personnel id",
            "payroll id",
            "employee id number",
        ],
    },
    CatalogEntry {
        entity: EntityType::MedicalLicense,
        patterns: &[(
            "MED_LICENSE",
            r"\b(?:LIC|MD|DMC|MED)[-/]?\d{4,10}\b",
            1.0,
        )],
        keywords: &[
            "medical license",
            "license number",
            "doctor license",
            "physician license",
            "medical registration",
        ],
    },
    CatalogEntry {
        entity: EntityType::VaClaimNumber,
        patterns: &[
            ("VA_CLAIM_CONTINUOUS", r"\b\d{9}\b", 0.85),
            ("VA_CLAIM_SPACED", r"\b\d{3}\s\d{3}\s\d{3}\b", 0.9),
            ("VA_CLAIM_HYPHENATED", r"\b\d{3}-\d{2}-\d{4}\b", 0.9),
        ],
        keywords: &[
            "va claim",
            "va claim number",
            "claim number",
            "va file number",
            "va file no",
            "claim #",
            "va benefits",
            "veterans affairs",
        ],
    },
];

/// Configuração de reconhecedor para cada entrada do catálogo embutido.
pub fn builtin_recognizers() -> Vec<RecognizerConfig> {
    CATALOG
        .iter()
        .map(|entry| {
            let patterns = entry
                .patterns
                .iter()
                .map(|(name, regex, score)| PatternConfig::new(*name, *regex, *score))
                .collect();
            RecognizerConfig::new(entry.entity, patterns).with_context(entry.keywords.iter().copied())
        })
        .collect()
}

/// Padrões compilados, indexados por tipo de entidade.
#[derive(Debug, Default)]
pub struct PatternLibrary {
    entries: BTreeMap<EntityType, Vec<Pattern>>,
}

impl PatternLibrary {
    /// Compila o catálogo embutido.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_configs(&builtin_recognizers())
    }

    /// Compila os padrões dos reconhecedores habilitados.
    ///
    /// Falha se alguma regex não compilar, se um score estiver fora de [0, 1],
    /// se um tipo não tiver padrões ou aparecer duas vezes.
    pub fn from_configs(configs: &[RecognizerConfig]) -> ConfigResult<Self> {
        let mut entries = BTreeMap::new();
        for config in configs.iter().filter(|c| c.enabled) {
            let entity = config.entity_type;
            if entries.contains_key(&entity) {
                return Err(ConfigError::DuplicateRecognizer { entity });
            }
            entries.insert(entity, compile_patterns(entity, &config.patterns)?);
        }
        Ok(Self { entries })
    }

    /// Lista ordenada de padrões de um tipo (vazia se o tipo não estiver registrado).
    pub fn patterns(&self, entity: EntityType) -> &[Pattern] {
        self.entries.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entity_types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.entries.keys().copied()
    }

    /// Entrega os padrões de um tipo ao seu reconhecedor.
    pub fn take(&mut self, entity: EntityType) -> Option<Vec<Pattern>> {
        self.entries.remove(&entity)
    }
}

fn compile_patterns(entity: EntityType, configs: &[PatternConfig]) -> ConfigResult<Vec<Pattern>> {
    if configs.is_empty() {
        return Err(ConfigError::NoPatterns { entity });
    }
    let mut seen = HashSet::new();
    let mut patterns = Vec::with_capacity(configs.len());
    for config in configs {
        if config.name.trim().is_empty() {
            return Err(ConfigError::UnnamedPattern { entity });
        }
        if !seen.insert(config.name.as_str()) {
            return Err(ConfigError::DuplicatePattern {
                entity,
                pattern: config.name.clone(),
            });
        }
        patterns.push(Pattern::new(config.name.clone(), &config.regex, config.score)?);
    }
    Ok(patterns)
}
