pub mod handlers;
pub mod profiles;
pub mod routes;
pub mod run;

pub use routes::create_router;
