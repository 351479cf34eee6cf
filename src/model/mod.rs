pub mod connection;
pub mod interface;
pub mod setting;

pub use connection::Connection;
pub use interface::Interface;
pub use setting::{Setting, SettingConfig};
