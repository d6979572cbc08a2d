use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/if_then_else.bas";
const EXPECTED: Expected = Expected {
    stdout: "Y\n",
    stderr: "",
};

#[test]
fn if_then_else_takes_true_branch() -> Result<(), Box<dyn Error>> {
    check_output(Path::new(SRC_PATH), EXPECTED)
}
