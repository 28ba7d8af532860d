use pest::iterators::Pair;

use crate::error::{AstBuildError, Position};

use super::Rule;

/// The closed set of type tags recognized by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Int,
    Float,
    Bool,
    String,
    Void,
}

impl TypeTag {
    pub fn from_pair(pair: Pair<Rule>) -> Result<TypeTag, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::type_name);

        let position = pair.line_col();

        match pair.as_str() {
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "bool" => Ok(TypeTag::Bool),
            "string" => Ok(TypeTag::String),
            "void" => Ok(TypeTag::Void),
            other => Err(invalid_type_tag(other, position)),
        }
    }
}

fn invalid_type_tag(found: &str, position: Position) -> AstBuildError {
    AstBuildError {
        position,
        message: format!("'{found}' is not a valid type tag"),
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Void => "void",
        };
        write!(f, "{s}")
    }
}
