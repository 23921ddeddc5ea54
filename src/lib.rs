pub mod cli;
pub mod config;
pub mod connector;
pub mod fs_ops;
pub mod install;
pub mod logging;
pub mod path_list;
pub mod paths;
