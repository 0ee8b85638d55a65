// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression — works for literals, consts, or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! json_file {
    // `<dir>/<stem>.json` shorthand for the data directory artifacts
    ($dir:expr, $stem:expr) => {
        ::std::path::Path::join(
            ::std::convert::AsRef::<::std::path::Path>::as_ref(&$dir),
            ::std::format!("{}.json", $stem),
        )
    };
}
