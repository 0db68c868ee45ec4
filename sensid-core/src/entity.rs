//! # Tipos de Entidade e Anotações
//!
//! Define o vocabulário fechado de identificadores sensíveis que o sistema
//! reconhece e o tipo de saída visível externamente, a [`Annotation`].
//!
//! ## Tipos de Entidade
//!
//! | Nome no fio         | Significado                              | Exemplos                 |
//! |---------------------|------------------------------------------|--------------------------|
//! | `BUSINESS_TAX_ID`   | EIN / Tax ID de empresa ou consultório   | 12-3456789               |
//! | `DOD_ID`            | Número de identificação do DoD           | DOD-1234567890           |
//! | `DATE_OF_BIRTH`     | Data de nascimento                       | 21/05/1994, 1994-05-21   |
//! | `SERVICE_NUMBER`    | Número de serviço militar/governamental  | AB1234567                |
//! | `EMPLOYEE_ID`       | Matrícula de funcionário                 | EMP-10492, ab-1234       |
//! | `MEDICAL_LICENSE`   | Licença médica                           | MD123456, LIC-987654     |
//! | `VA_CLAIM_NUMBER`   | Número de processo do VA                 | 123-45-6789              |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tipos de identificador reconhecidos.
///
/// A ordem de declaração é usada como desempate final na resolução de
/// sobreposições, então não deve ser reordenada sem motivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// **EIN**: Employer Identification Number, `NN-NNNNNNN`.
    BusinessTaxId,
    /// **DoD ID**: prefixo "DOD" seguido de 8 a 12 dígitos.
    DodId,
    /// **Data de nascimento**: dia-mês-ano ou ano-mês-dia.
    DateOfBirth,
    /// **Service Number**: 1 a 3 letras maiúsculas e 6 a 10 dígitos.
    ServiceNumber,
    /// **Employee ID**: matrícula com ou sem prefixo conhecido.
    EmployeeId,
    /// **Licença médica**: LIC/MD/DMC/MED seguido de dígitos.
    MedicalLicense,
    /// **VA Claim Number**: 9 dígitos, contínuos ou separados.
    VaClaimNumber,
}

impl EntityType {
    /// Todos os tipos em ordem de declaração.
    pub const ALL: [EntityType; 7] = [
        EntityType::BusinessTaxId,
        EntityType::DodId,
        EntityType::DateOfBirth,
        EntityType::ServiceNumber,
        EntityType::EmployeeId,
        EntityType::MedicalLicense,
        EntityType::VaClaimNumber,
    ];

    /// Nome estável usado na serialização (ex: "VA_CLAIM_NUMBER")
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::BusinessTaxId => "BUSINESS_TAX_ID",
            EntityType::DodId => "DOD_ID",
            EntityType::DateOfBirth => "DATE_OF_BIRTH",
            EntityType::ServiceNumber => "SERVICE_NUMBER",
            EntityType::EmployeeId => "EMPLOYEE_ID",
            EntityType::MedicalLicense => "MEDICAL_LICENSE",
            EntityType::VaClaimNumber => "VA_CLAIM_NUMBER",
        }
    }

    /// Cor CSS para highlight na UI
    pub fn color(&self) -> &'static str {
        match self {
            EntityType::BusinessTaxId => "#10b981", // verde esmeralda
            EntityType::DodId => "#1e3a8a",         // azul marinho
            EntityType::DateOfBirth => "#f59e0b",   // âmbar
            EntityType::ServiceNumber => "#65a30d", // verde oliva
            EntityType::EmployeeId => "#3b82f6",    // azul
            EntityType::MedicalLicense => "#ef4444", // vermelho
            EntityType::VaClaimNumber => "#8b5cf6", // violeta
        }
    }

    /// Ícone emoji para o tipo
    pub fn icon(&self) -> &'static str {
        match self {
            EntityType::BusinessTaxId => "🏢",
            EntityType::DodId => "🪖",
            EntityType::DateOfBirth => "🎂",
            EntityType::ServiceNumber => "🎖️",
            EntityType::EmployeeId => "🪪",
            EntityType::MedicalLicense => "🩺",
            EntityType::VaClaimNumber => "📄",
        }
    }

    /// Tenta parsear a partir do nome no fio (ex: "DOD_ID" → Some(DodId))
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == s)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uma detecção final, sem sobreposição com nenhuma outra do mesmo resultado.
///
/// `start` e `end` são offsets de byte no texto original (fim exclusivo), de modo
/// que `text == &input[start..end]` sempre vale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// Confiança final, em [0, 1]
    pub score: f64,
    /// Forma canônica devolvida pelo validador (ex: "1994-05-21")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

impl Annotation {
    /// Verifica se dois intervalos `[start, end)` se cruzam
    pub fn overlaps(&self, other: &Annotation) -> bool {
        spans_overlap((self.start, self.end), (other.start, other.end))
    }
}

/// `a.start < b.end && b.start < a.end`
pub(crate) fn spans_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}
