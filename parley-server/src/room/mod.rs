mod relay;
mod room_command;
mod room_registry;

pub use relay::*;
pub use room_command::*;
pub use room_registry::*;
