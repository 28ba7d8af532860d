use std::{error::Error, path::Path};

use test_utils::{check_compilation, Expected};

const FOR_PRINT: &str = "./programs/for_print.rut";
const HELLO: &str = "./programs/hello.rut";
const FLOAT_PROMOTION: &str = "./programs/float_promotion.rut";
const BOOL_BRANCH: &str = "./programs/bool_branch.rut";

#[test]
fn for_loop_prints_each_counter_value() -> Result<(), Box<dyn Error>> {
    check_compilation(
        Path::new(FOR_PRINT),
        Expected {
            stdout: "0\n1\n2\n",
            stderr: "",
        },
    )
}

#[test]
fn compile_and_run_hello() -> Result<(), Box<dyn Error>> {
    check_compilation(
        Path::new(HELLO),
        Expected {
            stdout: "Hello, World!\n",
            stderr: "",
        },
    )
}

#[test]
fn int_plus_float_promotes_and_prints_as_float() -> Result<(), Box<dyn Error>> {
    check_compilation(
        Path::new(FLOAT_PROMOTION),
        Expected {
            stdout: "3.500000\n",
            stderr: "",
        },
    )
}

#[test]
fn if_else_takes_the_true_branch() -> Result<(), Box<dyn Error>> {
    check_compilation(
        Path::new(BOOL_BRANCH),
        Expected {
            stdout: "yes\n",
            stderr: "",
        },
    )
}
