use pest::iterators::Pair;

use crate::error::{AstBuildError, Position};

use super::{Expression, Rule, TypeTag};

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: Option<TypeTag>,
    pub name: String,
    pub init: Option<Expression>,
    pub is_const: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Assignment {
        name: String,
        value: Expression,
        position: Position,
    },
    CompoundAssign {
        name: String,
        op: String,
        value: Expression,
        position: Position,
    },
    Increment {
        name: String,
        position: Position,
    },
    Decrement {
        name: String,
        position: Position,
    },
    If {
        condition: Expression,
        then_block: super::Block,
        else_block: Option<super::Block>,
        position: Position,
    },
    While {
        condition: Expression,
        body: super::Block,
        position: Position,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Expression,
        update: Option<Box<Statement>>,
        body: super::Block,
        position: Position,
    },
    Break {
        position: Position,
    },
    Continue {
        position: Position,
    },
    Return {
        value: Option<Expression>,
        position: Position,
    },
    Print {
        values: Vec<Expression>,
        position: Position,
    },
}

impl Statement {
    pub fn position(&self) -> Position {
        match self {
            Statement::Declaration(Declaration { position, .. })
            | Statement::Assignment { position, .. }
            | Statement::CompoundAssign { position, .. }
            | Statement::Increment { position, .. }
            | Statement::Decrement { position, .. }
            | Statement::If { position, .. }
            | Statement::While { position, .. }
            | Statement::For { position, .. }
            | Statement::Break { position }
            | Statement::Continue { position }
            | Statement::Return { position, .. }
            | Statement::Print { position, .. } => *position,
        }
    }

    pub fn from_pair(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::statement);
        let inner = pair
            .into_inner()
            .next()
            .expect("statement always wraps exactly one production");

        match inner.as_rule() {
            Rule::declaration => {
                let body = inner
                    .into_inner()
                    .next()
                    .expect("declaration ~ declaration_body");
                Ok(Statement::Declaration(declaration_from_body(body)?))
            }
            Rule::assignment_stmt => {
                let body = inner
                    .into_inner()
                    .next()
                    .expect("assignment_stmt ~ assignment_body");
                assignment_from_body(body)
            }
            Rule::compound_assign_stmt => {
                let body = inner
                    .into_inner()
                    .next()
                    .expect("compound_assign_stmt ~ compound_assign_body");
                compound_assign_from_body(body)
            }
            Rule::increment_stmt => {
                let body = inner
                    .into_inner()
                    .next()
                    .expect("increment_stmt ~ increment_body");
                increment_from_body(body)
            }
            Rule::decrement_stmt => {
                let body = inner
                    .into_inner()
                    .next()
                    .expect("decrement_stmt ~ decrement_body");
                decrement_from_body(body)
            }
            Rule::if_stmt => if_from_pair(inner),
            Rule::while_stmt => while_from_pair(inner),
            Rule::for_stmt => for_from_pair(inner),
            Rule::break_stmt => Ok(Statement::Break {
                position: inner.line_col(),
            }),
            Rule::continue_stmt => Ok(Statement::Continue {
                position: inner.line_col(),
            }),
            Rule::return_stmt => return_from_pair(inner),
            Rule::print_stmt => print_from_pair(inner),
            other => unreachable!("unexpected statement child {other:?}"),
        }
    }
}

fn declaration_from_body(pair: Pair<Rule>) -> Result<Declaration, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::declaration_body);
    let position = pair.line_col();
    let mut children = pair.into_inner();

    let keyword = children
        .next()
        .expect("declaration_body ~ decl_keyword")
        .as_str();
    let is_const = keyword == "const";

    let name = children
        .next()
        .expect("declaration_body ~ identifier")
        .as_str()
        .to_string();

    let mut ty = None;
    let mut init = None;
    for next in children {
        match next.as_rule() {
            Rule::type_name => ty = Some(TypeTag::from_pair(next)?),
            Rule::expression => init = Some(Expression::from_pair(next)?),
            other => unreachable!("unexpected declaration_body child {other:?}"),
        }
    }

    if is_const && init.is_none() {
        return Err(AstBuildError {
            position,
            message: format!("const '{name}' must have an initializer"),
        });
    }

    Ok(Declaration {
        ty,
        name,
        init,
        is_const,
        position,
    })
}

fn assignment_from_body(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::assignment_body);
    let position = pair.line_col();
    let mut children = pair.into_inner();
    let name = children
        .next()
        .expect("assignment_body ~ identifier")
        .as_str()
        .to_string();
    let value_pair = children.next().expect("assignment_body ~ expression");
    let value = Expression::from_pair(value_pair)?;
    Ok(Statement::Assignment {
        name,
        value,
        position,
    })
}

fn compound_assign_from_body(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::compound_assign_body);
    let position = pair.line_col();
    let mut children = pair.into_inner();
    let name = children
        .next()
        .expect("compound_assign_body ~ identifier")
        .as_str()
        .to_string();
    let op = children
        .next()
        .expect("compound_assign_body ~ compound_op")
        .as_str()
        .to_string();
    let value_pair = children.next().expect("compound_assign_body ~ expression");
    let value = Expression::from_pair(value_pair)?;
    Ok(Statement::CompoundAssign {
        name,
        op,
        value,
        position,
    })
}

fn increment_from_body(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::increment_body);
    let position = pair.line_col();
    let name = pair
        .into_inner()
        .next()
        .expect("increment_body ~ identifier")
        .as_str()
        .to_string();
    Ok(Statement::Increment { name, position })
}

fn decrement_from_body(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::decrement_body);
    let position = pair.line_col();
    let name = pair
        .into_inner()
        .next()
        .expect("decrement_body ~ identifier")
        .as_str()
        .to_string();
    Ok(Statement::Decrement { name, position })
}

fn if_from_pair(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::if_stmt);
    let position = pair.line_col();
    let mut children = pair.into_inner();

    let condition = Expression::from_pair(children.next().expect("if_stmt ~ expression"))?;
    let then_block = super::Block::from_pair(children.next().expect("if_stmt ~ block"))?;
    let else_block = match children.next() {
        Some(block_pair) => Some(super::Block::from_pair(block_pair)?),
        None => None,
    };

    Ok(Statement::If {
        condition,
        then_block,
        else_block,
        position,
    })
}

fn while_from_pair(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::while_stmt);
    let position = pair.line_col();
    let mut children = pair.into_inner();
    let condition = Expression::from_pair(children.next().expect("while_stmt ~ expression"))?;
    let body = super::Block::from_pair(children.next().expect("while_stmt ~ block"))?;
    Ok(Statement::While {
        condition,
        body,
        position,
    })
}

fn for_from_pair(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::for_stmt);
    let position = pair.line_col();

    let mut init = None;
    let mut condition = None;
    let mut update = None;
    let mut body = None;

    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::for_init => {
                let inner = child
                    .into_inner()
                    .next()
                    .expect("for_init wraps declaration_body or assignment_body");
                let stmt = match inner.as_rule() {
                    Rule::declaration_body => Statement::Declaration(declaration_from_body(inner)?),
                    Rule::assignment_body => assignment_from_body(inner)?,
                    other => unreachable!("unexpected for_init child {other:?}"),
                };
                init = Some(Box::new(stmt));
            }
            Rule::expression => {
                condition = Some(Expression::from_pair(child)?);
            }
            Rule::for_update => {
                let inner = child
                    .into_inner()
                    .next()
                    .expect("for_update wraps one statement body");
                let stmt = match inner.as_rule() {
                    Rule::compound_assign_body => compound_assign_from_body(inner)?,
                    Rule::increment_body => increment_from_body(inner)?,
                    Rule::decrement_body => decrement_from_body(inner)?,
                    Rule::assignment_body => assignment_from_body(inner)?,
                    other => unreachable!("unexpected for_update child {other:?}"),
                };
                update = Some(Box::new(stmt));
            }
            Rule::block => {
                body = Some(super::Block::from_pair(child)?);
            }
            other => unreachable!("unexpected for_stmt child {other:?}"),
        }
    }

    Ok(Statement::For {
        init,
        condition: condition.expect("for_stmt always has a condition expression"),
        update,
        body: body.expect("for_stmt always has a body block"),
        position,
    })
}

fn return_from_pair(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::return_stmt);
    let position = pair.line_col();
    let value = match pair.into_inner().next() {
        Some(expr_pair) => Some(Expression::from_pair(expr_pair)?),
        None => None,
    };
    Ok(Statement::Return { value, position })
}

fn print_from_pair(pair: Pair<Rule>) -> Result<Statement, AstBuildError> {
    assert_eq!(pair.as_rule(), Rule::print_stmt);
    let position = pair.line_col();
    let mut values = vec![];
    for expr_pair in pair.into_inner() {
        values.push(Expression::from_pair(expr_pair)?);
    }
    Ok(Statement::Print { values, position })
}
