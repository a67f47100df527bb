pub mod theme;
pub mod report;

pub use theme::Theme;
