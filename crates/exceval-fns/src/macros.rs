#[macro_export]
macro_rules! register_functions {
    ( $($fn:expr),+ $(,)? ) => {{
        use std::sync::Arc;
        $(
            $crate::function_registry::register_function(Arc::new($fn));
        )+
    }};
}

/// Expands to the `caps()` method of a [`crate::function::Function`]
/// impl, or-ing the named flags together.
#[macro_export]
macro_rules! func_caps {
    ( $($cap:ident),+ $(,)? ) => {
        fn caps(&self) -> $crate::function::FnCaps {
            $( $crate::function::FnCaps::$cap )|+
        }
    };
}
