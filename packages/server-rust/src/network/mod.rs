//! HTTP transport: settings, middleware, handlers, and route assembly.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod settings;

pub use handlers::AppState;
pub use routes::{build_router, RouteAccess, RouteDef, ROUTES};
pub use settings::{AppSettings, BrandingSettings};
