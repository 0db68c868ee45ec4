//! # Validadores Semânticos
//!
//! O padrão garante a **forma**; o validador garante o **significado**. Um
//! "31/02/2000" tem cara de data mas não existe no calendário; "000000000" tem
//! nove dígitos mas é claramente fictício. Validadores rodam depois da
//! pontuação por contexto e decidem a inclusão independentemente do score:
//! um valor inválido é descartado mesmo com confiança máxima.
//!
//! Validadores são funções puras do texto candidato. A data corrente entra
//! como parâmetro explícito ([`ValidationContext::today`]), nunca pelo relógio,
//! para que os testes sejam determinísticos.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::entity::EntityType;

/// Idade máxima plausível para uma data de nascimento.
pub const MAX_AGE_YEARS: i32 = 120;

/// Sequências fictícias conhecidas de VA Claim Number.
pub const DEFAULT_CLAIM_DENYLIST: [&str; 3] = ["123456789", "987654321", "000000000"];

/// Informação disponível para o validador além do texto casado.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Nome do padrão que produziu o candidato
    pub pattern: &'a str,
    pub today: NaiveDate,
}

/// Resultado de uma validação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Aceito, opcionalmente com uma forma canônica
    Accept(Option<String>),
    Reject(Rejection),
}

/// Motivo de descarte de um candidato. Não é um erro: é filtragem esperada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// O texto não tem a estrutura que o validador espera
    Malformed,
    InvalidMonth(u32),
    /// Dia inexistente naquele mês/ano (ex: 31/02)
    InvalidDay { year: i32, month: u32, day: u32 },
    FutureDate(NaiveDate),
    ImplausibleAge(i32),
    DigitCount(usize),
    RepeatedDigits,
    Denylisted(String),
    /// Parte de um número decimal maior
    EmbeddedInNumber,
    BelowThreshold,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Malformed => write!(f, "formato não reconhecido"),
            Rejection::InvalidMonth(m) => write!(f, "mês {m} inválido"),
            Rejection::InvalidDay { year, month, day } => {
                write!(f, "dia {day} não existe em {month:02}/{year}")
            }
            Rejection::FutureDate(d) => write!(f, "data {d} está no futuro"),
            Rejection::ImplausibleAge(age) => write!(f, "idade implícita de {age} anos"),
            Rejection::DigitCount(n) => write!(f, "{n} dígitos em vez de 9"),
            Rejection::RepeatedDigits => write!(f, "todos os dígitos iguais"),
            Rejection::Denylisted(v) => write!(f, "{v} é uma sequência fictícia conhecida"),
            Rejection::EmbeddedInNumber => write!(f, "parte de um número decimal"),
            Rejection::BelowThreshold => write!(f, "score abaixo do mínimo"),
        }
    }
}

/// Checagem semântica de um tipo de entidade.
pub trait Validator: Send + Sync {
    fn validate(&self, candidate: &str, ctx: &ValidationContext<'_>) -> Validation;
}

/// Ordem dos campos de uma data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayMonthYear,
    YearMonthDay,
}

/// Valida datas de nascimento: calendário real, não futura, idade ≤ 120 anos.
///
/// A ordem dos campos vem do padrão que casou. Padrões desconhecidos caem na
/// heurística de largura: um primeiro campo de 4 dígitos é ano.
#[derive(Debug, Clone)]
pub struct DateOfBirthValidator {
    orders: Vec<(String, DateOrder)>,
}

impl DateOfBirthValidator {
    pub fn new() -> Self {
        Self {
            orders: vec![
                ("DOB_DDMMYYYY".to_string(), DateOrder::DayMonthYear),
                ("DOB_YYYYMMDD".to_string(), DateOrder::YearMonthDay),
            ],
        }
    }

    /// Associa um padrão (ex: vindo de configuração) a uma ordem de campos.
    pub fn with_order(mut self, pattern: impl Into<String>, order: DateOrder) -> Self {
        let pattern = pattern.into();
        self.orders.retain(|(name, _)| *name != pattern);
        self.orders.push((pattern, order));
        self
    }

    fn order_for(&self, pattern: &str, fields: &[&str]) -> DateOrder {
        self.orders
            .iter()
            .find(|(name, _)| name == pattern)
            .map(|(_, order)| *order)
            .unwrap_or(if fields[0].len() == 4 {
                DateOrder::YearMonthDay
            } else {
                DateOrder::DayMonthYear
            })
    }
}

impl Default for DateOfBirthValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for DateOfBirthValidator {
    fn validate(&self, candidate: &str, ctx: &ValidationContext<'_>) -> Validation {
        let fields: Vec<&str> = candidate.trim().split(['-', '/', '.']).collect();
        if fields.len() != 3 || fields.iter().any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
            return Validation::Reject(Rejection::Malformed);
        }

        let (y, m, d) = match self.order_for(ctx.pattern, &fields) {
            DateOrder::DayMonthYear => (fields[2], fields[1], fields[0]),
            DateOrder::YearMonthDay => (fields[0], fields[1], fields[2]),
        };
        let (Ok(year), Ok(month), Ok(day)) = (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) else {
            return Validation::Reject(Rejection::Malformed);
        };

        if !(1..=12).contains(&month) {
            return Validation::Reject(Rejection::InvalidMonth(month));
        }
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            return Validation::Reject(Rejection::InvalidDay { year, month, day });
        };
        if date > ctx.today {
            return Validation::Reject(Rejection::FutureDate(date));
        }
        let age = age_on(date, ctx.today);
        if age > MAX_AGE_YEARS {
            return Validation::Reject(Rejection::ImplausibleAge(age));
        }

        Validation::Accept(Some(date.format("%Y-%m-%d").to_string()))
    }
}

/// Idade implícita: diferença entre o ano corrente e o ano de nascimento.
fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - birth.year()
}

/// Valida VA Claim Numbers: exatamente 9 dígitos, não repetidos, fora da lista negra.
#[derive(Debug, Clone)]
pub struct VaClaimNumberValidator {
    denylist: Vec<String>,
}

impl VaClaimNumberValidator {
    pub fn new() -> Self {
        Self::with_denylist(DEFAULT_CLAIM_DENYLIST)
    }

    pub fn with_denylist<I, S>(denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denylist: denylist.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for VaClaimNumberValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for VaClaimNumberValidator {
    fn validate(&self, candidate: &str, _ctx: &ValidationContext<'_>) -> Validation {
        let digits: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() != 9 {
            return Validation::Reject(Rejection::DigitCount(digits.len()));
        }
        let first = digits.as_bytes()[0];
        if digits.bytes().all(|b| b == first) {
            return Validation::Reject(Rejection::RepeatedDigits);
        }
        if self.denylist.iter().any(|d| *d == digits) {
            return Validation::Reject(Rejection::Denylisted(digits));
        }

        Validation::Accept(Some(digits))
    }
}

/// Validador embutido de cada tipo, se existir.
///
/// Os demais tipos confiam na estrutura do próprio padrão.
pub fn builtin_validator(entity: EntityType, denylist: Option<&[String]>) -> Option<Box<dyn Validator>> {
    match entity {
        EntityType::DateOfBirth => Some(Box::new(DateOfBirthValidator::new())),
        EntityType::VaClaimNumber => Some(Box::new(match denylist {
            Some(list) => VaClaimNumberValidator::with_denylist(list.iter().cloned()),
            None => VaClaimNumberValidator::new(),
        })),
        _ => None,
    }
}
