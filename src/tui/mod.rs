//! Terminal dashboard: command box, session stats, live scan state and
//! the results report.

mod render;
mod terminal;
mod text;
mod theme;

pub use terminal::run;
pub use text::report_text;
