use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/store_and_multiply.bas";
const EXPECTED: Expected = Expected {
    stdout: "10\n",
    stderr: "",
};

#[test]
fn store_then_read_back_through_ans() -> Result<(), Box<dyn Error>> {
    check_output(Path::new(SRC_PATH), EXPECTED)
}
