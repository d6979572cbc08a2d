use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const PB_PATH: &str = "./target/debug/pb";

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

fn run_interpreter(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(PB_PATH).arg(src_path).output()
}

/// Run `src_path` through the `pb` binary and assert its stdout/stderr
/// match `expected`, and that it exited successfully.
pub fn check_output(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_interpreter(src_path)?;

    expected.assert_matches(&output)?;
    assert!(
        output.status.success(),
        "pb exited with status {:?}",
        output.status.code()
    );

    Ok(())
}

/// Run `src_path` through the `pb` binary and assert it exits with a
/// non-zero status, i.e. a fatal `InterpError` was reported.
pub fn check_execution_error(src_path: &Path) -> Result<(), Box<dyn Error>> {
    let output = run_interpreter(src_path)?;

    println!("{output:?}");
    assert!(
        !output.status.success(),
        "pb should have exited with a non-zero status"
    );

    Ok(())
}
