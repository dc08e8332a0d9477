pub mod logging;
pub mod settings;
pub mod status;
