use pest::iterators::Pair;

use crate::error::{AstBuildError, Position};

use super::{Rule, TypeTag};

/// A literal value as decoded at AST-build time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Float(f64),
    Bool(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        value: LiteralValue,
        position: Position,
    },
    Identifier {
        name: String,
        position: Position,
    },
    Binary {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
        position: Position,
    },
    Unary {
        op: String,
        operand: Box<Expression>,
        position: Position,
    },
    Call {
        callee: String,
        args: Vec<Expression>,
        position: Position,
    },
    Cast {
        target: TypeTag,
        inner: Box<Expression>,
        position: Position,
    },
}

impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Expression::Literal { position, .. }
            | Expression::Identifier { position, .. }
            | Expression::Binary { position, .. }
            | Expression::Unary { position, .. }
            | Expression::Call { position, .. }
            | Expression::Cast { position, .. } => *position,
        }
    }

    /// Entry point: `expression` is the top rule of the precedence chain.
    pub fn from_pair(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::expression);
        let mut inner = pair.into_inner();
        let logical_or = inner.next().expect("expression ~ logical_or");
        Self::from_binary_chain(logical_or)
    }

    /// Every layer of the precedence chain (`logical_or` down to
    /// `multiplicative`) has the same shape: one sub-expression optionally
    /// followed by repeated `(op ~ sub-expression)` pairs, folded
    /// left-associatively.
    fn from_binary_chain(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        let rule = pair.as_rule();
        let position = pair.line_col();
        let mut children = pair.into_inner();

        let first = children.next().expect("binary chain has a left operand");
        let mut left = Self::from_chain_operand(rule, first)?;

        while let Some(op_pair) = children.next() {
            let op = op_pair.as_str().to_string();
            let rhs_pair = children
                .next()
                .expect("binary operator is always followed by a right operand");
            let right = Self::from_chain_operand(rule, rhs_pair)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }

        Ok(left)
    }

    /// Dispatches a single operand of a precedence-chain rule to the next
    /// rule down the chain, bottoming out at `unary`.
    fn from_chain_operand(
        parent_rule: Rule,
        pair: Pair<Rule>,
    ) -> Result<Expression, AstBuildError> {
        match parent_rule {
            Rule::logical_or | Rule::logical_and | Rule::equality | Rule::relational
            | Rule::additive | Rule::multiplicative => {
                match pair.as_rule() {
                    Rule::unary => Self::unary_from_pair(pair),
                    _ => Self::from_binary_chain(pair),
                }
            }
            _ => unreachable!("from_chain_operand called with non-chain rule {parent_rule:?}"),
        }
    }

    fn unary_from_pair(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::unary);
        let position = pair.line_col();
        let mut children = pair.into_inner();
        let first = children.next().expect("unary always has a child");

        match first.as_rule() {
            Rule::cast_expr => Self::cast_from_pair(first),
            Rule::unary_op => {
                let op = first.as_str().to_string();
                let operand_pair = children
                    .next()
                    .expect("unary_op is always followed by its operand");
                let operand = Self::unary_from_pair(operand_pair)?;
                Ok(Expression::Unary {
                    op,
                    operand: Box::new(operand),
                    position,
                })
            }
            Rule::primary => Self::primary_from_pair(first),
            other => unreachable!("unexpected unary child {other:?}"),
        }
    }

    fn cast_from_pair(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::cast_expr);
        let position = pair.line_col();
        let mut inner = pair.into_inner();
        let type_pair = inner.next().expect("cast_expr ~ type_name");
        let target = TypeTag::from_pair(type_pair)?;
        let operand_pair = inner.next().expect("cast_expr ~ unary");
        let operand = Self::unary_from_pair(operand_pair)?;
        Ok(Expression::Cast {
            target,
            inner: Box::new(operand),
            position,
        })
    }

    fn primary_from_pair(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::primary);
        let position = pair.line_col();
        let inner = pair.into_inner().next().expect("primary always has a child");

        match inner.as_rule() {
            Rule::call_expr => Self::call_from_pair(inner),
            Rule::literal => Self::literal_from_pair(inner),
            Rule::identifier_expr => {
                let name = inner
                    .into_inner()
                    .next()
                    .expect("identifier_expr ~ identifier")
                    .as_str()
                    .to_string();
                Ok(Expression::Identifier { name, position })
            }
            Rule::expression => Self::from_pair(inner),
            other => unreachable!("unexpected primary child {other:?}"),
        }
    }

    fn call_from_pair(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::call_expr);
        let position = pair.line_col();
        let mut inner = pair.into_inner();
        let callee = inner
            .next()
            .expect("call_expr ~ identifier")
            .as_str()
            .to_string();

        let mut args = vec![];
        if let Some(arg_list) = inner.next() {
            for arg in arg_list.into_inner() {
                args.push(Expression::from_pair(arg)?);
            }
        }

        Ok(Expression::Call {
            callee,
            args,
            position,
        })
    }

    fn literal_from_pair(pair: Pair<Rule>) -> Result<Expression, AstBuildError> {
        assert_eq!(pair.as_rule(), Rule::literal);
        let position = pair.line_col();
        let inner = pair.into_inner().next().expect("literal always has a child");

        let value = match inner.as_rule() {
            Rule::float_literal => {
                let parsed: f64 = inner.as_str().parse().map_err(|_| AstBuildError {
                    position,
                    message: format!("'{}' is not a valid float literal", inner.as_str()),
                })?;
                LiteralValue::Float(parsed)
            }
            Rule::int_literal => {
                let parsed: i32 = inner.as_str().parse().map_err(|_| AstBuildError {
                    position,
                    message: format!("'{}' is not a valid int literal", inner.as_str()),
                })?;
                LiteralValue::Int(parsed)
            }
            Rule::bool_literal => LiteralValue::Bool(inner.as_str() == "true"),
            Rule::string_literal => {
                let raw = inner
                    .into_inner()
                    .next()
                    .expect("string_literal ~ string_inner")
                    .as_str();
                let decoded = unescape::unescape(raw).ok_or_else(|| AstBuildError {
                    position,
                    message: format!("invalid escape sequence in string literal \"{raw}\""),
                })?;
                LiteralValue::String(decoded)
            }
            other => unreachable!("unexpected literal child {other:?}"),
        };

        Ok(Expression::Literal { value, position })
    }
}
