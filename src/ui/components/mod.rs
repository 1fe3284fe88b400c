pub mod column_picker;
pub mod command_input;
pub mod input;
pub mod key_result;
pub mod prompt;

pub use key_result::KeyResult;
