use std::{error::Error, path::Path};

use test_utils::check_failing_build;

#[test]
fn reassigning_a_const_is_a_mutability_error() -> Result<(), Box<dyn Error>> {
    check_failing_build(Path::new("./programs/const_reassign.rut"))
}

#[test]
fn referencing_an_undeclared_name_is_a_name_error() -> Result<(), Box<dyn Error>> {
    check_failing_build(Path::new("./programs/name_error.rut"))
}
