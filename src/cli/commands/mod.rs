pub mod check;
mod files;
pub mod init;
pub mod privatize;
pub mod sync;
