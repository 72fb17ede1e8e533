//! Core library for the ZetriScript drawing language.
//! Source text is lexed into tokens, parsed into a [`Program`] whose
//! statements are addressed by 3D coordinate labels, and run by a
//! tree-walking [`Interpreter`] that jumps between labels with `goto`.

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod runtime;
pub mod value;

pub use ast::Program;
pub use diagnostics::{
    Diagnostic, DiagnosticKind, LexError, RuntimeError, RuntimeErrorKind, SyntaxError, ZetriError,
};
pub use environment::SymbolTable;
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, parse_program};
pub use position::{Coordinate, SourceSpan, TextPosition};
pub use runtime::{Cursor, Interpreter, InterpreterOptions, StepHook, StepLimit};
pub use value::Value;
