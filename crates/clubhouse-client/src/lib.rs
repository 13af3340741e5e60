pub mod announcements;
pub mod api;
pub mod app;
pub mod catalog;
pub mod error;
pub mod modal;
pub mod notify;
pub mod render;
pub mod sequence;
pub mod session;
pub mod view;

pub use api::ApiClient;
pub use app::App;
pub use error::{ClientError, Result};
