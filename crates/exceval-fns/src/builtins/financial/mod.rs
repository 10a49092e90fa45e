pub mod depreciation;
pub mod tvm;

pub fn register_builtins() {
    tvm::register_builtins();
    depreciation::register_builtins();
}
