pub mod auth;

pub mod users;

pub mod evaluations;

pub mod reports;

pub use auth::configure_auth_routes;
pub use evaluations::configure_evaluations_routes;
pub use reports::configure_reports_routes;
pub use users::configure_user_routes;
