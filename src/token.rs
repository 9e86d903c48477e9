use lazy_static::lazy_static;
use std::fmt::{self, Display, Formatter};
use strum_macros::EnumDiscriminants;

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(derive(Hash, strum_macros::Display))]
#[strum_discriminants(name(TokenType))]
pub enum TokenKind {
    Eof,

    // Identifiers and literals
    Identifier(String),
    Number(f64),
    String(String),

    // Punctuation
    Assign,
    Colon,
    Comma,
    Period,
    LBracket,
    RBracket,

    // Keywords
    Enlist,
    Mission,
    With,
    Retreat,
    Report,
    Execute,
    Recon,
    Secure,
    Shout,
    Interrogate,
    In,

    // Operator words
    Reinforce,
    Expend,
    Amplify,
    Decimate,
    Outranks,

    // Multi-word keywords
    ElseRecon,
    FallbackPosition,
    WhileUnderSiege,
    BreakSiege,
    PatrolThrough,
    EndPatrol,
    IsEqualTo,
    IsNotEqualTo,
    IsOutrankedBy,
    OutranksOrHolds,
    IsOutrankedOrHeldBy,
    AndAlso,
    OrElse,
}

lazy_static! {
    /// Phrases recognised before identifier scanning, longest first.
    pub static ref PHRASES: Vec<(&'static str, TokenKind)> = {
        let mut phrases = vec![
            ("else recon", TokenKind::ElseRecon),
            ("fallback position", TokenKind::FallbackPosition),
            ("while under siege", TokenKind::WhileUnderSiege),
            ("break siege", TokenKind::BreakSiege),
            ("patrol through", TokenKind::PatrolThrough),
            ("end patrol", TokenKind::EndPatrol),
            ("is equal to", TokenKind::IsEqualTo),
            ("is not equal to", TokenKind::IsNotEqualTo),
            ("is outranked by", TokenKind::IsOutrankedBy),
            ("outranks or holds", TokenKind::OutranksOrHolds),
            ("is outranked or held by", TokenKind::IsOutrankedOrHeldBy),
            ("and also", TokenKind::AndAlso),
            ("or else", TokenKind::OrElse),
        ];
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        phrases
    };
}

impl From<&str> for TokenKind {
    fn from(text: &str) -> Self {
        match text {
            "enlist" => Self::Enlist,
            "mission" => Self::Mission,
            "with" => Self::With,
            "retreat" => Self::Retreat,
            "report" => Self::Report,
            "execute" => Self::Execute,
            "recon" => Self::Recon,
            "secure" => Self::Secure,
            "shout" => Self::Shout,
            "interrogate" => Self::Interrogate,
            "in" => Self::In,
            "reinforce" => Self::Reinforce,
            "expend" => Self::Expend,
            "amplify" => Self::Amplify,
            "decimate" => Self::Decimate,
            "outranks" => Self::Outranks,
            identifier => Self::Identifier(identifier.to_owned()),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let text = match self {
            Self::Eof => "end of input",
            Self::Identifier(name) => return write!(f, "{}", name),
            Self::Number(n) => return write!(f, "{}", n),
            Self::String(s) => return write!(f, "\"{}\"", s),
            Self::Assign => "=",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Period => ".",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Enlist => "enlist",
            Self::Mission => "mission",
            Self::With => "with",
            Self::Retreat => "retreat",
            Self::Report => "report",
            Self::Execute => "execute",
            Self::Recon => "recon",
            Self::Secure => "secure",
            Self::Shout => "shout",
            Self::Interrogate => "interrogate",
            Self::In => "in",
            Self::Reinforce => "reinforce",
            Self::Expend => "expend",
            Self::Amplify => "amplify",
            Self::Decimate => "decimate",
            Self::Outranks => "outranks",
            phrase => PHRASES
                .iter()
                .find(|(_, kind)| kind == phrase)
                .map(|(text, _)| *text)
                .unwrap_or("?"),
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        TokenType::from(&self.kind) == token_type
    }

    pub fn token_type(&self) -> TokenType {
        TokenType::from(&self.kind)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
