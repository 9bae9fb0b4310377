use std::{
    fs,
    path::{Path, PathBuf},
};

use xshell::{cmd, Shell};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap().to_path_buf()
}

#[test]
fn check_code_formatting() {
    let sh = Shell::new().unwrap();
    sh.change_dir(project_root());
    if cmd!(sh, "cargo fmt --all -- --check").run().is_err() {
        panic!("please format the code with `cargo fmt --all`")
    }
}

#[test]
fn no_trailing_whitespace() {
    let root = project_root();
    let mut offenders = Vec::new();
    for dir in ["src", "tests", "demos", "xtask/src"] {
        rust_files(&root.join(dir), &mut offenders);
    }
    offenders.retain(|path| {
        let text = fs::read_to_string(path).unwrap();
        text.lines().any(|line| line.ends_with(' ') || line.ends_with('\t'))
    });
    if !offenders.is_empty() {
        panic!("trailing whitespace in:\n{offenders:#?}")
    }
}

fn rust_files(dir: &Path, acc: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_files(&path, acc)
        } else if path.extension().map_or(false, |it| it == "rs") {
            acc.push(path)
        }
    }
}
