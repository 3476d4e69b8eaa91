pub mod difficulty_select;
pub mod menu;
pub mod message;
pub mod progress_bar;
pub mod quiz_view;
pub mod stats_view;
