pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod store;
pub mod sync;
