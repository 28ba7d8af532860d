//! Stable error taxonomy for the compiler core.
//!
//! Every fallible stage of the pipeline (grammar, AST builder, code generator)
//! reports failures through [`CompileError`]. Each variant wraps a small,
//! hand-written struct carrying the offending `(line, column)` and enough
//! context to render a useful message, mirroring the error-module layout
//! used elsewhere in this codebase rather than reaching for a derive-macro
//! error crate.

use std::fmt;

use crate::ast::Rule;

/// 1-based `(line, column)`, as produced by the grammar library.
pub type Position = (usize, usize);

#[derive(Debug)]
pub struct ParseError {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "parse error at {line}:{col}: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let position = match err.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        ParseError {
            position,
            message: err.variant.message().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct AstBuildError {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for AstBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "ast build error at {line}:{col}: {}", self.message)
    }
}

impl std::error::Error for AstBuildError {}

#[derive(Debug)]
pub struct NameError {
    pub position: Position,
    pub name: String,
    pub message: String,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "name error at {line}:{col}: '{}': {}", self.name, self.message)
    }
}

impl std::error::Error for NameError {}

#[derive(Debug)]
pub struct TypeError {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "type error at {line}:{col}: {}", self.message)
    }
}

impl std::error::Error for TypeError {}

#[derive(Debug)]
pub struct MutabilityError {
    pub position: Position,
    pub name: String,
}

impl fmt::Display for MutabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(
            f,
            "mutability error at {line}:{col}: cannot assign to const '{}'",
            self.name
        )
    }
}

impl std::error::Error for MutabilityError {}

#[derive(Debug)]
pub struct ArityError {
    pub position: Position,
    pub callee: String,
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for ArityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(
            f,
            "arity error at {line}:{col}: '{}' expects {} argument(s), found {}",
            self.callee, self.expected, self.found
        )
    }
}

impl std::error::Error for ArityError {}

#[derive(Debug)]
pub struct ControlError {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "control error at {line}:{col}: {}", self.message)
    }
}

impl std::error::Error for ControlError {}

/// Union of every error kind the core can raise. Fatal: callers never try
/// to recover or continue compiling after receiving one of these.
#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    AstBuild(AstBuildError),
    Name(NameError),
    Type(TypeError),
    Mutability(MutabilityError),
    Arity(ArityError),
    Control(ControlError),
}

impl CompileError {
    pub fn position(&self) -> Position {
        match self {
            CompileError::Parse(e) => e.position,
            CompileError::AstBuild(e) => e.position,
            CompileError::Name(e) => e.position,
            CompileError::Type(e) => e.position,
            CompileError::Mutability(e) => e.position,
            CompileError::Arity(e) => e.position,
            CompileError::Control(e) => e.position,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Parse(_) => "ParseError",
            CompileError::AstBuild(_) => "AstBuildError",
            CompileError::Name(_) => "NameError",
            CompileError::Type(_) => "TypeError",
            CompileError::Mutability(_) => "MutabilityError",
            CompileError::Arity(_) => "ArityError",
            CompileError::Control(_) => "ControlError",
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::AstBuild(e) => write!(f, "{e}"),
            CompileError::Name(e) => write!(f, "{e}"),
            CompileError::Type(e) => write!(f, "{e}"),
            CompileError::Mutability(e) => write!(f, "{e}"),
            CompileError::Arity(e) => write!(f, "{e}"),
            CompileError::Control(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<pest::error::Error<Rule>> for CompileError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        CompileError::Parse(ParseError::from(err))
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<AstBuildError> for CompileError {
    fn from(e: AstBuildError) -> Self {
        CompileError::AstBuild(e)
    }
}

impl From<NameError> for CompileError {
    fn from(e: NameError) -> Self {
        CompileError::Name(e)
    }
}

impl From<TypeError> for CompileError {
    fn from(e: TypeError) -> Self {
        CompileError::Type(e)
    }
}

impl From<MutabilityError> for CompileError {
    fn from(e: MutabilityError) -> Self {
        CompileError::Mutability(e)
    }
}

impl From<ArityError> for CompileError {
    fn from(e: ArityError) -> Self {
        CompileError::Arity(e)
    }
}

impl From<ControlError> for CompileError {
    fn from(e: ControlError) -> Self {
        CompileError::Control(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_column_and_kind() {
        let err = CompileError::Name(NameError {
            position: (3, 7),
            name: "foo".to_string(),
            message: "not declared".to_string(),
        });
        assert_eq!(err.position(), (3, 7));
        assert_eq!(err.kind(), "NameError");
        assert!(err.to_string().contains("3:7"));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn mutability_error_names_the_offending_const() {
        let err = MutabilityError {
            position: (1, 1),
            name: "x".to_string(),
        };
        assert!(err.to_string().contains("const 'x'"));
    }
}
