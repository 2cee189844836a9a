//! Tipo de erro unificado do simulador com formatação estável.
use core::fmt;
use std::collections::BTreeMap;

use crate::amm::error_catalog::{default_locale_message, SimErrorCode};

const CONTEXT_VALUE_MAX: usize = 256;

fn sanitize_value(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\n' | '\r' | '\t' => cleaned.push(' '),
            _ => cleaned.push(ch),
        }
    }
    if cleaned.len() > CONTEXT_VALUE_MAX {
        let mut truncated = cleaned
            .chars()
            .take(CONTEXT_VALUE_MAX - 1)
            .collect::<String>();
        truncated.push('…');
        truncated
    } else {
        cleaned
    }
}

fn render_template(template: &str, context: &BTreeMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '{' {
            let mut key = String::new();
            while let Some(next) = chars.next() {
                if next == '}' {
                    break;
                }
                key.push(next);
            }
            if key.is_empty() || !context.contains_key(&key) {
                rendered.push('{');
                rendered.push_str(&key);
                rendered.push('}');
            } else if let Some(value) = context.get(&key) {
                rendered.push_str(value);
            }
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

/// Erro do simulador com contexto estruturado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimError {
    pub code: SimErrorCode,
    pub context: BTreeMap<String, String>,
}

impl SimError {
    /// Cria um novo erro sem contexto adicional.
    pub fn new(code: SimErrorCode) -> Self {
        Self {
            code,
            context: BTreeMap::new(),
        }
    }

    /// Adiciona um par chave/valor ao contexto.
    pub fn with_context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let key_string = key.into();
        if !key_string.is_empty() {
            let sanitized = sanitize_value(&value.to_string());
            self.context.insert(key_string, sanitized);
        }
        self
    }

    /// Atalho para o código, usado nos `match` de quem chama.
    pub fn code(&self) -> SimErrorCode {
        self.code
    }

    fn resolved_message(&self) -> String {
        let template = default_locale_message(self.code);
        render_template(template, &self.context)
    }

    /// Mensagem curta para UI.
    pub fn to_user_string(&self) -> String {
        let message = self.resolved_message();
        format!("[{}] {}", self.code.code(), message)
    }

    /// Serialização estável em JSON para logs (chaves em ordem, contexto incluso).
    pub fn to_log_json(&self) -> String {
        serde_json::json!({
            "code": self.code.code(),
            "title": self.code.title(),
            "message": self.resolved_message(),
            "context": &self.context,
        })
        .to_string()
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl std::error::Error for SimError {}

/// Resultado padrão para operações do simulador.
pub type Result<T> = std::result::Result<T, SimError>;

#[macro_export]
macro_rules! sim_err {
  ($code:expr) => {{
    $crate::amm::error::SimError::new($code)
  }};
  ($code:expr, $($key:ident => $value:expr),+ $(,)?) => {{
    let mut err = $crate::amm::error::SimError::new($code);
    $(
      err = err.with_context(stringify!($key), $value);
    )+
    err
  }};
  ($code:expr, { $($key:expr => $value:expr),+ $(,)? }) => {{
    let mut err = $crate::amm::error::SimError::new($code);
    $(
      err = err.with_context($key, $value);
    )+
    err
  }};
  ($code:expr, $($key:expr => $value:expr),+ $(,)?) => {{
    let mut err = $crate::amm::error::SimError::new($code);
    $(
      err = err.with_context($key, $value);
    )+
    err
  }};
}

#[macro_export]
macro_rules! sim_bail {
  ($($tt:tt)*) => {
    return Err($crate::sim_err!($($tt)*))
  };
}
