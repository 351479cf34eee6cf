pub mod connections;
pub mod interfaces;
pub mod settings;

pub use connections::Connections;
pub use interfaces::Interfaces;
pub use settings::Settings;
