use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Informe um telefone válido.")]
    Invalid,
    #[error("Telefone é obrigatório.")]
    Required,
    #[error("Telefone não pode conter letras.")]
    ContainsLetters,
    #[error("Formato de telefone inválido.")]
    InvalidFormat,
    #[error("Use um número do Japão (+81).")]
    NotJapan,
    #[error("Use um número japonês começando com 0, 81 ou +81.")]
    UnknownPrefix,
    #[error("Número inválido. Verifique DDD e quantidade de dígitos.")]
    InvalidNumber,
}

impl PhoneError {
    /// Stable label for machine-readable output.
    pub fn kind(self) -> &'static str {
        match self {
            PhoneError::Invalid => "invalid",
            PhoneError::Required => "required",
            PhoneError::ContainsLetters => "letters",
            PhoneError::InvalidFormat => "format",
            PhoneError::NotJapan => "country",
            PhoneError::UnknownPrefix => "prefix",
            PhoneError::InvalidNumber => "length",
        }
    }
}
