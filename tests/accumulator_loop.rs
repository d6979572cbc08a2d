use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/accumulator_loop.bas";
const EXPECTED: Expected = Expected {
    stdout: "55\n",
    stderr: "",
};

#[test]
fn for_loop_accumulates_a_running_sum() -> Result<(), Box<dyn Error>> {
    check_output(Path::new(SRC_PATH), EXPECTED)
}
