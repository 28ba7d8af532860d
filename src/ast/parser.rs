use pest::Parser;

use crate::error::ParseError;

#[derive(Parser)]
#[grammar = "rutaceae.pest"]
pub struct RutParser;

impl RutParser {
    /// Parses a whole source file into a `program` parse tree.
    ///
    /// Returns the single `program` pair; callers descend into it with
    /// `.into_inner()` to reach the top-level `function_def` productions.
    pub fn parse_program(source: &str) -> Result<pest::iterators::Pair<Rule>, ParseError> {
        let mut pairs = Self::parse(Rule::program, source).map_err(ParseError::from)?;
        Ok(pairs.next().expect("program rule always produces one pair"))
    }
}
