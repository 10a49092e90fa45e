pub mod combinatorics;
pub mod criteria_aggregates;
pub mod numeric;
pub mod reduction;
pub mod trig;

pub fn register_builtins() {
    reduction::register_builtins();
    numeric::register_builtins();
    trig::register_builtins();
    combinatorics::register_builtins();
    criteria_aggregates::register_builtins();
}
