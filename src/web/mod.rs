pub mod error;
pub mod health;
pub mod toggles;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    health::configure(conf);
    toggles::configure(conf);
}
