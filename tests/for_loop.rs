use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/for_loop.bas";
const EXPECTED: Expected = Expected {
    stdout: "1\n2\n3\n4\n5\n",
    stderr: "",
};

#[test]
fn for_loop_counts_to_five() -> Result<(), Box<dyn Error>> {
    check_output(Path::new(SRC_PATH), EXPECTED)
}
