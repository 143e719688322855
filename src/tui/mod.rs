pub mod app;
pub mod board;
pub mod column;
pub mod confirm;
pub mod editor;
pub mod list;
pub mod overlay;
pub mod render;
pub mod text_field;
pub mod theme;

pub use app::run;
