pub mod config_io;
pub mod logbook_io;
