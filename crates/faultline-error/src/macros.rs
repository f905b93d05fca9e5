/// Path of the enclosing function, e.g. `my_service::handlers::create_user`.
///
/// Closures resolve to the function that defines them.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::trace::function_path(__type_name_of(__here))
    }};
}

/// [`CError::new`](crate::CError::new) that also records the enclosing
/// function's path as the first op.
///
/// ```rust,ignore
/// let err = cerror!(&ctx, classify_db(&raw), raw);
/// ```
#[macro_export]
macro_rules! cerror {
    ($ctx:expr, $kind:expr, $err:expr $(,)?) => {
        $crate::CError::at(
            $crate::Origin::named($crate::function_name!()),
            $ctx,
            $kind,
            $err,
        )
    };
}

/// Formatting form of [`cerror!`].
///
/// ```rust,ignore
/// let err = cerrorf!(&ctx, HttpKind::NotExist, "user {id} not found");
/// ```
#[macro_export]
macro_rules! cerrorf {
    ($ctx:expr, $kind:expr, $($arg:tt)+) => {
        $crate::CError::at(
            $crate::Origin::named($crate::function_name!()),
            $ctx,
            $kind,
            ::std::format!($($arg)+),
        )
    };
}
