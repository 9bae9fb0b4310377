use std::ffi::OsString;

use pennant::Registry;

fn flags() -> Registry {
    let mut flags = Registry::new("cmd", "");
    flags.flag_str("path", "", "Where to look", None).unwrap();
    flags
}

#[cfg(unix)]
fn main() {
    use std::os::unix::ffi::OsStringExt;

    let res = flags().parse(vec![
        OsString::from("cmd"),
        OsString::from("-path"),
        OsString::from_vec(vec![254].into()),
    ]);
    eprintln!("res = {:?}", res);

    let res = flags().parse(vec![OsString::from("cmd"), OsString::from_vec(vec![255].into())]);
    eprintln!("res = {:?}", res);
}

#[cfg(windows)]
fn main() {
    use std::os::windows::ffi::OsStringExt;

    let res = flags().parse(vec![
        OsString::from("cmd"),
        OsString::from("-path"),
        OsString::from_wide(&[0xD800]),
    ]);
    eprintln!("res = {:?}", res);

    let res = flags().parse(vec![OsString::from("cmd"), OsString::from_wide(&[0xDC00])]);
    eprintln!("res = {:?}", res);
}

#[cfg(not(any(unix, windows)))]
fn main() {}
