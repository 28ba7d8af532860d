use pest::iterators::Pair;

use crate::error::AstBuildError;

use super::{FunctionDef, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
}

impl Program {
    pub fn from_pair(pair: Pair<Rule>) -> Result<Program, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::program);

        let mut functions = vec![];
        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::function_def => functions.push(FunctionDef::from_pair(child)?),
                Rule::EOI => {}
                other => unreachable!("unexpected program child {other:?}"),
            }
        }

        Ok(Program { functions })
    }
}
