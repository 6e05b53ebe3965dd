//! Helper macros for common patterns in the PRBAC server

/// Generate handlers for RBAC v1 operations that have no implementation
/// yet. Each answers `501 Not Implemented` naming its operation.
///
/// # Example
///
/// ```rust,ignore
/// placeholder_handlers! {
///     /// List policies
///     list_policies,
/// }
/// ```
#[macro_export]
macro_rules! placeholder_handlers {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub async fn $name() -> $crate::error::ApiError {
                tracing::debug!(operation = stringify!($name), "Placeholder operation called");
                $crate::error::ApiError::not_implemented(stringify!($name))
            }
        )+
    };
}
