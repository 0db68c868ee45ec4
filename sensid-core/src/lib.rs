//! # sensid-core — Reconhecimento de Identificadores Sensíveis
//!
//! Este crate encontra identificadores estruturados sensíveis em texto livre
//! (EIN, DoD ID, data de nascimento, service number, matrícula de funcionário,
//! licença médica, VA claim number), atribui uma confiança a cada achado e
//! resolve conflitos quando candidatos se sobrepõem.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em pipeline linear:
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Casamento** ([`engine`]): cada padrão da [`library`] roda sobre o texto inteiro.
//! 3.  **Contexto** ([`context`]): palavras-chave próximas aumentam a confiança.
//! 4.  **Validação** ([`validator`]): calendário, idade, dígitos repetidos, lista negra.
//! 5.  **Resolução** ([`resolver`]): sobreposições viram uma única leitura por região.
//! 6.  **Saída**: Lista de [`Annotation`] ordenada por posição.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sensid_core::{EntityType, Registry};
//!
//! // 1. Constrói o registro uma única vez (compila todas as regex)
//! let registry = Registry::builtin().expect("catálogo embutido é válido");
//!
//! // 2. Reconhece apenas EINs
//! let text = "The company EIN is 12-3456789.";
//! let annotations = registry.recognize(text, Some(&[EntityType::BusinessTaxId]));
//!
//! assert_eq!(annotations.len(), 1);
//! assert_eq!(annotations[0].text, "12-3456789");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`registry`]: Orquestrador e ponto de entrada.
//! - [`config`]: Configuração (embutida ou TOML).
//! - [`corpus`]: Textos de demonstração.

pub mod config;
pub mod context;
pub mod corpus;
pub mod engine;
pub mod entity;
pub mod error;
pub mod library;
pub mod pattern;
pub mod recognizer;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use config::RegistryConfig;
pub use entity::{Annotation, EntityType};
pub use error::{ConfigError, ConfigResult};
pub use recognizer::Recognizer;
pub use registry::{RecognitionEvent, Registry};
pub use validator::{Rejection, Validation};
