mod input;
mod key_result;
mod menu;
mod search_input;

pub use key_result::KeyResult;
pub use menu::{Menu, MenuEvent, MenuItem};
pub use search_input::{SearchEvent, SearchInput};
