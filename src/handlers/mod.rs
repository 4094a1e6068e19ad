pub mod price;
pub mod settings;
pub mod subscriber;
pub mod watch;
