use std::{error::Error, path::Path};

use test_utils::check_exit_code;

#[test]
fn return_literal_exits_with_that_value() -> Result<(), Box<dyn Error>> {
    check_exit_code(Path::new("./programs/return_literal.rut"), 42)
}

#[test]
fn sum_of_two_declared_variables() -> Result<(), Box<dyn Error>> {
    check_exit_code(Path::new("./programs/sum_vars.rut"), 30)
}

#[test]
fn while_loop_accumulates_a_sum() -> Result<(), Box<dyn Error>> {
    check_exit_code(Path::new("./programs/while_sum.rut"), 10)
}

#[test]
fn forward_referenced_function_call() -> Result<(), Box<dyn Error>> {
    check_exit_code(Path::new("./programs/forward_call.rut"), 5)
}
