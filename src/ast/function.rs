use pest::iterators::Pair;

use crate::error::{AstBuildError, Position};

use super::{Block, Rule, TypeTag};

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeTag,
    pub name: String,
    pub position: Position,
}

impl Param {
    pub fn from_pair(pair: Pair<Rule>) -> Result<Param, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::param);
        let position = pair.line_col();
        let mut children = pair.into_inner();
        let ty = TypeTag::from_pair(children.next().expect("param ~ type_name"))?;
        let name = children
            .next()
            .expect("param ~ identifier")
            .as_str()
            .to_string();
        Ok(Param { ty, name, position })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub return_type: TypeTag,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub position: Position,
}

impl FunctionDef {
    pub fn from_pair(pair: Pair<Rule>) -> Result<FunctionDef, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::function_def);
        let position = pair.line_col();
        let mut children = pair.into_inner();

        let return_type = TypeTag::from_pair(children.next().expect("function_def ~ type_name"))?;
        let name = children
            .next()
            .expect("function_def ~ identifier")
            .as_str()
            .to_string();

        let mut params = vec![];
        let mut body = None;
        for next in children {
            match next.as_rule() {
                Rule::param_list => {
                    for param in next.into_inner() {
                        params.push(Param::from_pair(param)?);
                    }
                }
                Rule::block => {
                    body = Some(Block::from_pair(next)?);
                }
                other => unreachable!("unexpected function_def child {other:?}"),
            }
        }

        Ok(FunctionDef {
            return_type,
            name,
            params,
            body: body.expect("function_def always has a body block"),
            position,
        })
    }
}
