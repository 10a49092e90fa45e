use crate::function::Function;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::{Arc, Once};

// Case-insensitive registry keyed by upper-cased canonical name.
static REG: Lazy<DashMap<String, Arc<dyn Function>>> = Lazy::new(DashMap::new);

// Optional alias map: ALIAS -> CANONICAL_NAME, both uppercase.
static ALIASES: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

static BUILTINS: Once = Once::new();

#[inline]
fn norm<S: AsRef<str>>(s: S) -> String {
    s.as_ref().to_uppercase()
}

fn ensure_builtins() {
    BUILTINS.call_once(crate::builtins::load_builtins);
}

pub fn register_function(f: Arc<dyn Function>) {
    REG.insert(norm(f.name()), f);
}

/// Resolve a function by name. Case-insensitive, alias-aware. Builtins
/// are loaded on first use; afterwards the map is only read, so lookups
/// are freely shareable across threads.
pub fn get(name: &str) -> Option<Arc<dyn Function>> {
    ensure_builtins();
    let key = norm(name);
    if let Some(v) = REG.get(&key) {
        return Some(Arc::clone(v.value()));
    }
    // Resolve alias → canonical, then look up
    if let Some(canon) = ALIASES.get(&key) {
        if let Some(v) = REG.get(canon.value()) {
            return Some(Arc::clone(v.value()));
        }
    }
    None
}

/// Register an alias name for an existing function. All names are
/// normalized to uppercase.
pub fn register_alias(alias: &str, target_name: &str) {
    ALIASES.insert(norm(alias), norm(target_name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let f = get("sum").expect("SUM registered");
        assert_eq!(f.name(), "SUM");
        assert!(get("SUM").is_some());
        assert!(get("Sum").is_some());
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(get("NO.SUCH.FUNCTION").is_none());
    }

    #[test]
    fn aliases_resolve_to_canonical() {
        let f = get("FORECAST.LINEAR").expect("alias registered");
        assert_eq!(f.name(), "FORECAST");
    }
}
