pub mod database;
pub mod datetime;
pub mod engineering;
pub mod financial;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod stats;
pub mod text;
pub mod utils;

/// Register every builtin family. Called exactly once by the registry
/// behind a `Once`; the map is immutable afterwards.
pub fn load_builtins() {
    math::register_builtins();
    financial::register_builtins();
    stats::register_builtins();
    engineering::register_builtins();
    datetime::register_builtins();
    text::register_builtins();
    lookup::register_builtins();
    database::register_builtins();
    info::register_builtins();
    logical::register_builtins();
}
