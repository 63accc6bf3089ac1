mod input_bar;
mod message_list;
mod status_bar;

pub use input_bar::{InputAction, InputBar};
pub use message_list::MessageList;
pub use status_bar::StatusBar;
