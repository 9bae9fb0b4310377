
use std::fmt::Write;

use expect_test::{expect, Expect};
use pennant::{ErrorKind, Registry, Value};

fn cargo() -> Registry {
    let mut reg = Registry::new("cargo", "Rust's package manager");
    reg.flag_bool("verbose", false, "Use verbose output", None).unwrap();
    reg.flag_u64("jobs", 1, "Number of parallel jobs", None).unwrap();
    reg.flag_str("color", "auto", "Coloring: auto, always, never", None).unwrap();

    reg.declare_subcommand("build", "Compile the current package").unwrap();
    reg.flag_bool("release", false, "Build artifacts in release mode", Some("build")).unwrap();
    reg.flag_str("target", "", "Build for the target triple", Some("build")).unwrap();

    reg.declare_subcommand("test", "Run the tests").unwrap();
    reg.flag_bool("release", false, "Test in release mode", Some("test")).unwrap();
    reg.flag_u64("jobs", 0, "Number of test threads", Some("test")).unwrap();
    reg
}

fn check(mut reg: Registry, args: &str, expect: Expect) {
    let argv = std::iter::once("prog").chain(args.split_ascii_whitespace());
    match reg.parse(argv) {
        Ok(()) => expect.assert_eq(&dump(&reg)),
        Err(err) => expect.assert_eq(&err.to_string()),
    }
}

fn dump(reg: &Registry) -> String {
    let mut buf = String::new();
    for flag in reg.global_flags() {
        writeln!(buf, "-{} = {}", flag.name(), flag.value()).unwrap();
    }
    for sub in reg.subcommands() {
        let active = if sub.is_active() { " (active)" } else { "" };
        writeln!(buf, "{}{active}", sub.name()).unwrap();
        for flag in sub.flags() {
            writeln!(buf, "    -{} = {}", flag.name(), flag.value()).unwrap();
        }
    }
    buf
}

#[test]
fn empty() {
    check(
        cargo(),
        "",
        expect![[r#"
            -verbose = false
            -jobs = 1
            -color = "auto"
            build
                -release = false
                -target = ""
            test
                -release = false
                -jobs = 0
        "#]],
    );
    check(Registry::new("prog", ""), "", expect![[""]]);
}

#[test]
fn global_flags() {
    check(
        cargo(),
        "-verbose -jobs 8 -color never",
        expect![[r#"
            -verbose = true
            -jobs = 8
            -color = "never"
            build
                -release = false
                -target = ""
            test
                -release = false
                -jobs = 0
        "#]],
    );
    check(
        cargo(),
        "-jobs 1 -jobs 0x10 -color always -color never",
        expect![[r#"
            -verbose = false
            -jobs = 16
            -color = "never"
            build
                -release = false
                -target = ""
            test
                -release = false
                -jobs = 0
        "#]],
    );
}

#[test]
fn subcommands() {
    check(
        cargo(),
        "build -release -target x86_64",
        expect![[r#"
            -verbose = false
            -jobs = 1
            -color = "auto"
            build (active)
                -release = true
                -target = "x86_64"
            test
                -release = false
                -jobs = 0
        "#]],
    );
    check(
        cargo(),
        "test -release -jobs 010",
        expect![[r#"
            -verbose = false
            -jobs = 1
            -color = "auto"
            build
                -release = false
                -target = ""
            test (active)
                -release = true
                -jobs = 8
        "#]],
    );
    check(
        cargo(),
        "build",
        expect![[r#"
            -verbose = false
            -jobs = 1
            -color = "auto"
            build (active)
                -release = false
                -target = ""
            test
                -release = false
                -jobs = 0
        "#]],
    );
}

#[test]
fn edge_cases() {
    check(
        cargo(),
        "-color -verbose",
        expect![[r#"
            -verbose = false
            -jobs = 1
            -color = "-verbose"
            build
                -release = false
                -target = ""
            test
                -release = false
                -jobs = 0
        "#]],
    );
    check(
        cargo(),
        "-- -verbose --",
        expect![[r#"
            -verbose = true
            -jobs = 1
            -color = "auto"
            build
                -release = false
                -target = ""
            test
                -release = false
                -jobs = 0
        "#]],
    );
    check(cargo(), "-- build", expect!["Unknown flag: `build`"]);
}

#[test]
fn errors() {
    check(cargo(), "nosuchcmd", expect!["Unknown subcommand: `nosuchcmd`"]);
    check(cargo(), "-release", expect!["Unknown flag: `-release`"]);
    check(cargo(), "build -verbose", expect!["Unknown flag: `-verbose`"]);
    check(cargo(), "-verbose stray", expect!["Unknown flag: `stray`"]);
    check(cargo(), "--verbose", expect!["Unknown flag: `--verbose`"]);
    check(cargo(), "-", expect!["Unknown flag: `-`"]);
    check(cargo(), "-jobs", expect!["expected a value for `-jobs`"]);
    check(cargo(), "build -target", expect!["expected a value for `-target`"]);
    check(cargo(), "-jobs lol", expect!["Can't parse `-jobs`, invalid number: `lol`"]);
    check(cargo(), "-jobs -1", expect!["Can't parse `-jobs`, invalid number: `-1`"]);
    check(
        cargo(),
        "-jobs 18446744073709551616",
        expect!["Can't parse `-jobs`, invalid number: `18446744073709551616`"],
    );
}

#[test]
fn error_state() {
    let mut reg = cargo();
    let quiet = reg.flag_bool("quiet", false, "", None).unwrap();
    let jobs = reg.lookup_flag(None, "jobs").unwrap();

    let argv = ["prog", "-quiet", "-jobs", "not-a-number", "-color", "never"];
    let err = reg.parse(argv).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    assert_eq!(reg.last_error(), Some(ErrorKind::InvalidNumber));
    assert_eq!(reg.error_message(), Some("invalid number or overflowed number is given"));

    // no rollback, and nothing after the bad token is applied
    assert!(*reg.value(quiet));
    assert_eq!(reg.global_flags()[jobs.index()].value(), &Value::U64(1));
    assert_eq!(reg.global_flags()[2].value(), &Value::Str("auto".to_string()));

    reg.parse(["prog"]).unwrap();
    assert_eq!(reg.last_error(), None);
    assert_eq!(reg.error_message(), None);
}

#[test]
fn unknown_subcommand_activates_nothing() {
    let mut reg = cargo();
    let err = reg.parse(["prog", "nosuchcmd", "-release"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SubcommandNotFound);
    assert!(reg.active_subcommand().is_none());
    assert!(reg.subcommands().iter().all(|it| !it.is_active()));
}

#[test]
fn reparse_moves_activation() {
    let mut reg = cargo();
    let build = reg.lookup_subcommand("build").unwrap();
    let test = reg.lookup_subcommand("test").unwrap();

    reg.parse(["prog", "build"]).unwrap();
    assert!(reg.is_active(build));
    assert!(!reg.is_active(test));

    reg.parse(["prog", "test"]).unwrap();
    assert!(!reg.is_active(build));
    assert!(reg.is_active(test));
    assert_eq!(reg.active_subcommand().map(|it| it.name()), Some("test"));

    reg.parse(["prog", "-verbose"]).unwrap();
    assert!(reg.active_subcommand().is_none());
}

#[test]
fn same_name_in_different_scopes() {
    let mut reg = cargo();
    let build_release = reg.lookup_flag(Some("build"), "release").unwrap();
    let test_release = reg.lookup_flag(Some("test"), "release").unwrap();
    assert_ne!(build_release, test_release);

    reg.parse(["prog", "test", "-release", "-jobs", "4"]).unwrap();
    assert_eq!(reg.subcommands()[0].flags()[build_release.index()].value(), &Value::Bool(false));
    assert_eq!(reg.subcommands()[1].flags()[test_release.index()].value(), &Value::Bool(true));
    assert_eq!(reg.subcommands()[1].flags()[1].value(), &Value::U64(4));
    assert_eq!(reg.global_flags()[1].value(), &Value::U64(1));
}

#[cfg(unix)]
#[test]
fn non_utf8() {
    use std::{ffi::OsString, os::unix::ffi::OsStringExt};

    let mut reg = cargo();
    let err = reg.parse(vec![
        OsString::from("prog"),
        OsString::from("-color"),
        OsString::from_vec(vec![254]),
    ]);
    expect!["Can't parse `-color`, invalid utf8"].assert_eq(&err.unwrap_err().to_string());

    let mut reg = cargo();
    let err = reg.parse(vec![OsString::from("prog"), OsString::from_vec(vec![255])]);
    assert_eq!(err.unwrap_err().kind(), ErrorKind::SubcommandNotFound);

    // a leading dash means flag position even when the rest is not utf-8
    let mut reg = cargo();
    let err = reg.parse(vec![OsString::from("prog"), OsString::from_vec(vec![b'-', 0xff])]);
    assert_eq!(err.unwrap_err().kind(), ErrorKind::FlagNotFound);
    assert!(reg.active_subcommand().is_none());
}
