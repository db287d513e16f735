pub mod progress;
pub mod prompt;
pub mod selection;
pub mod selection_view;

pub use progress::create_spinner;
pub use prompt::{print_comparison, print_result};
pub use selection::{SelectionEvent, SelectionState};
pub use selection_view::run_selection;
