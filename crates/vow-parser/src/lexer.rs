//! Tokens of the contract mini-grammar.
//!
//! One token set serves both spellings: type expressions
//! (`?->Account|null`) and definitions position keys (`"?1.2->"`).

use logos::Logos;

/// A mini-grammar token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// `?`, the nullable marker.
    #[token("?")]
    Question,

    /// `->`, the promise wrapper.
    #[token("->")]
    Arrow,

    /// `?>`, the promise wrapper with nullable resolution.
    #[token("?>")]
    NullArrow,

    /// `[]`, the iterable wrapper.
    #[token("[]")]
    Brackets,

    /// `[?]`, the iterable wrapper with nullable elements.
    #[token("[?]")]
    NullBrackets,

    /// `|`, the union separator.
    #[token("|")]
    Pipe,

    /// `.`, the nested position separator.
    #[token(".")]
    Dot,

    /// The reserved return position.
    #[token("return")]
    Return,

    /// A 1-based parameter position.
    #[regex(r"[0-9]+")]
    Int,

    /// A type name.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
}
