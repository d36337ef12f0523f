//! Navigation between views.

/// Changes the active view of the host application.
///
/// Implementations are provided by the presentation layer. `route` is one of the constants in
/// [crate::endpoints].
pub trait Navigator: Send + Sync {
    /// Make `route` the active view.
    fn navigate(&self, route: &str);
}
