pub mod app;
pub mod args;
pub mod error;
pub mod model;
pub mod mvu;
pub mod repl;
pub mod score;
pub mod storage;
pub mod view;

pub use app::App;
pub use error::CoreError;
