//! Reusable UI components

pub mod prompt;
pub mod service_list;
pub mod status_bar;
pub mod task_table;
pub mod text_viewer;

pub use prompt::{Prompt, PromptOutcome, PromptResult, PromptView};
pub use service_list::{NoSelection, ServiceList, ServiceListHandle, SortMode};
pub use status_bar::StatusBar;
pub use task_table::TaskTable;
pub use text_viewer::{TextViewer, ViewerOutcome};
