use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/label_and_stop.bas";
const EXPECTED: Expected = Expected {
    stdout: "hi\n",
    stderr: "",
};

#[test]
fn stop_ends_the_program_before_goto_loops_back() -> Result<(), Box<dyn Error>> {
    check_output(Path::new(SRC_PATH), EXPECTED)
}
