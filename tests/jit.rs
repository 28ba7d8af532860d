use std::{error::Error, path::Path};

use test_utils::check_jit_run;

/// `run` (§10) must observe the same stdout and process-exit behavior as
/// `build` followed by executing the linked binary, without ever leaving an
/// object file or executable on disk.
#[test]
fn jit_run_matches_the_compiled_executable() -> Result<(), Box<dyn Error>> {
    check_jit_run(Path::new("./programs/mutability.rut"), "4\n", 0)
}
