pub mod history;
pub mod page;
pub mod scorecard;
pub mod text;

pub use history::render_history;
pub use page::render_page;
pub use scorecard::render_scorecard;
pub use text::{render_card_text, render_history_text};
