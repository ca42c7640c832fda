pub mod config;
pub mod consts;
pub mod error;
pub mod image_io;
pub mod measure;
pub mod register;
pub mod segment;
pub mod session;
pub mod types;
pub mod view;
pub mod volume;
