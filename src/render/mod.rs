pub mod text;
pub mod panel;
pub mod grid;
pub mod stats_bar;

pub use grid::{ColumnHeader, ComparisonAssembler};
pub use panel::{Letterbox, PanelRenderer, label_origin};
pub use stats_bar::StatsBar;
pub use text::TextRenderer;
