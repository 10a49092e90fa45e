pub mod bases;
pub mod bitwise;
pub mod complex;
pub mod convert;
pub mod special;

pub fn register_builtins() {
    bitwise::register_builtins();
    bases::register_builtins();
    complex::register_builtins();
    convert::register_builtins();
    special::register_builtins();
}
