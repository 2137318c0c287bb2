pub mod question;
pub mod rich_text;

pub use question::*;
pub use rich_text::{RichText, Segment};
