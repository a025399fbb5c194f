use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unterminated comment starting at {pos}")]
    UnterminatedComment { pos: usize },

    #[error("Unterminated tag starting at {pos}")]
    UnterminatedTag { pos: usize },

    #[error("Lexer error at {pos}")]
    LexerError { pos: usize },
}

impl ParseError {
    pub fn unterminated_comment(pos: usize) -> Self {
        Self::UnterminatedComment { pos }
    }

    pub fn unterminated_tag(pos: usize) -> Self {
        Self::UnterminatedTag { pos }
    }

    pub fn lexer_error(pos: usize) -> Self {
        Self::LexerError { pos }
    }

    /// Byte offset into the source where the error was detected
    pub fn pos(&self) -> usize {
        match self {
            Self::UnterminatedComment { pos }
            | Self::UnterminatedTag { pos }
            | Self::LexerError { pos } => *pos,
        }
    }
}
