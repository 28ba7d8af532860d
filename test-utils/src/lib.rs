use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const RUTACEAE_PATH: &str = "./target/debug/rutaceae";
const OUTPUT_PATH: &str = "./output";

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        Ok(())
    }
}

fn run_build(src_path: &Path, out_path: &Path) -> Result<Output, io::Error> {
    Command::new(RUTACEAE_PATH)
        .arg("build")
        .arg("-o")
        .arg(out_path)
        .arg(src_path)
        .output()
}

fn run_jit(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(RUTACEAE_PATH).arg("run").arg(src_path).output()
}

/// Builds `src_path` to a native executable, runs it, and asserts that its
/// stdout/stderr match `expected` and that it exited successfully.
pub fn check_compilation(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let out_path = Path::new(OUTPUT_PATH).join(src_path.file_stem().unwrap());
    std::fs::create_dir_all(OUTPUT_PATH)?;

    let compile_output = run_build(src_path, &out_path)?;
    let compile_stderr = str::from_utf8(&compile_output.stderr)?;

    assert!(compile_stderr.is_empty(), "{}", compile_stderr);
    assert!(
        compile_output.status.success(),
        "rutaceae build exited with status {:?}",
        compile_output.status.code()
    );

    let output = Command::new(&out_path).output()?;

    assert!(
        output.status.success(),
        "compiled program exited with status {:?}",
        output.status.code()
    );
    expected.assert_matches(&output)?;

    Ok(())
}

/// Builds `src_path`, runs it, and asserts that its exit code matches
/// `expected_code` (used for programs whose `main` returns a value that
/// exercises arithmetic or control flow rather than `print`).
pub fn check_exit_code(src_path: &Path, expected_code: i32) -> Result<(), Box<dyn Error>> {
    let out_path = Path::new(OUTPUT_PATH).join(src_path.file_stem().unwrap());
    std::fs::create_dir_all(OUTPUT_PATH)?;

    let compile_output = run_build(src_path, &out_path)?;
    let compile_stderr = str::from_utf8(&compile_output.stderr)?;
    assert!(compile_stderr.is_empty(), "{}", compile_stderr);
    assert!(
        compile_output.status.success(),
        "rutaceae build exited with status {:?}",
        compile_output.status.code()
    );

    let output = Command::new(&out_path).output()?;
    assert_eq!(output.status.code(), Some(expected_code));

    Ok(())
}

/// Runs `src_path` through the JIT (`rutaceae run`) instead of the linked
/// executable and asserts that its stdout matches `expected_stdout` and
/// that the JIT process itself exits with `expected_code`.
pub fn check_jit_run(
    src_path: &Path,
    expected_stdout: &str,
    expected_code: i32,
) -> Result<(), Box<dyn Error>> {
    let output = run_jit(src_path)?;
    assert_eq!(str::from_utf8(&output.stdout)?, expected_stdout);
    assert_eq!(output.status.code(), Some(expected_code));
    Ok(())
}

/// Asserts that building `src_path` fails (a parse, name, type, mutability,
/// or control-flow error was reported) rather than producing an executable.
pub fn check_failing_build(src_path: &Path) -> Result<(), Box<dyn Error>> {
    let out_path = Path::new(OUTPUT_PATH).join(src_path.file_stem().unwrap());
    std::fs::create_dir_all(OUTPUT_PATH)?;

    let compile_output = run_build(src_path, &out_path)?;

    assert!(
        !compile_output.status.success(),
        "rutaceae build should have failed for {}",
        src_path.display()
    );

    Ok(())
}
