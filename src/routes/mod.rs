mod chat;
mod contact;
mod health_check;
mod helpers;
mod index;

pub use chat::*;
pub use contact::*;
pub use health_check::*;
pub use helpers::*;
pub use index::*;
