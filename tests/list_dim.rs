use std::{error::Error, path::Path};

use test_utils::{check_output, Expected};

const SRC_PATH: &str = "./demos/list_dim.bas";
const EXPECTED: Expected = Expected {
    stdout: "3\n",
    stderr: "",
};

#[test]
fn dim_reports_list_length() -> Result<(), Box<dyn Error>> {
    check_output(Path::new(SRC_PATH), EXPECTED)
}
