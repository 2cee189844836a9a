//! Catálogo imutável de erros do simulador.
use core::fmt;

/// Código de erro do simulador.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum SimErrorCode {
    /// String decimal malformada (inclui notação científica inválida).
    ParseError,
    /// Quantidade zero ou negativa onde se exige valor positivo.
    InvalidAmount,
    /// Reserva, passivo ou parâmetro de curva não positivo.
    InsufficientState,
    /// Divisor zero no mul_div.
    DivisionByZero,
    /// Raiz quadrada de valor negativo.
    NegativeSquareRoot,
    /// Discriminante do PAV negativo.
    InvalidSwapParameters,
    /// Saída calculada negativa.
    NegativeResult,
    /// Saída calculada acima da reserva da contraparte.
    InsufficientLiquidity,
    /// Pré-condição das fórmulas WP violada.
    CalculationOverflow,
}

impl SimErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ParseError => "STP-0001",
            Self::InvalidAmount => "STP-0002",
            Self::InsufficientState => "STP-0003",
            Self::DivisionByZero => "STP-0004",
            Self::NegativeSquareRoot => "STP-0005",
            Self::InvalidSwapParameters => "STP-0006",
            Self::NegativeResult => "STP-0007",
            Self::InsufficientLiquidity => "STP-0008",
            Self::CalculationOverflow => "STP-0009",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ParseError => "Valor inválido",
            Self::InvalidAmount => "Quantidade inválida",
            Self::InsufficientState => "Estado insuficiente",
            Self::DivisionByZero => "Divisão por zero",
            Self::NegativeSquareRoot => "Raiz de negativo",
            Self::InvalidSwapParameters => "Parâmetros de swap inválidos",
            Self::NegativeResult => "Resultado negativo",
            Self::InsufficientLiquidity => "Liquidez insuficiente",
            Self::CalculationOverflow => "Limite de cálculo excedido",
        }
    }

    /// Mensagem base em português. Aceita placeholders `{chave}` do contexto.
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::ParseError => "não foi possível interpretar '{input}' como número decimal",
            Self::InvalidAmount => "amount deve ser > 0",
            Self::InsufficientState => "{field} deve ser > 0",
            Self::DivisionByZero => "divisão por zero",
            Self::NegativeSquareRoot => "raiz quadrada de valor negativo",
            Self::InvalidSwapParameters => "swap grande demais para a liquidez atual (delta < 0)",
            Self::NegativeResult => "saída negativa em {stage}",
            Self::InsufficientLiquidity => "saída excede a reserva em {stage}",
            Self::CalculationOverflow => "pré-condição violada em {stage}",
        }
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [SimErrorCode] {
        const ALL: &[SimErrorCode] = &[
            SimErrorCode::ParseError,
            SimErrorCode::InvalidAmount,
            SimErrorCode::InsufficientState,
            SimErrorCode::DivisionByZero,
            SimErrorCode::NegativeSquareRoot,
            SimErrorCode::InvalidSwapParameters,
            SimErrorCode::NegativeResult,
            SimErrorCode::InsufficientLiquidity,
            SimErrorCode::CalculationOverflow,
        ];
        ALL
    }
}

impl fmt::Display for SimErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: SimErrorCode) -> &'static str {
    code.message_pt()
}
