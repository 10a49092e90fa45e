pub mod core;
pub mod find_substitute;
pub mod format;
pub mod regex_fns;
pub mod value_text;
pub mod width;

pub fn register_builtins() {
    core::register_builtins();
    find_substitute::register_builtins();
    value_text::register_builtins();
    width::register_builtins();
    format::register_builtins();
    regex_fns::register_builtins();
}
