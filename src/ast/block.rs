use pest::iterators::Pair;

use crate::error::{AstBuildError, Position};

use super::{Rule, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub position: Position,
}

impl Block {
    pub fn from_pair(pair: Pair<Rule>) -> Result<Block, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::block);
        let position = pair.line_col();

        let mut statements = vec![];
        for statement in pair.into_inner() {
            statements.push(Statement::from_pair(statement)?);
        }

        Ok(Block {
            statements,
            position,
        })
    }
}
