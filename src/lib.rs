pub mod config;
pub mod descriptor;
pub mod domain;
pub mod humanize;
pub mod matcher;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod resolver;
pub mod session;
pub mod template;
pub mod transport;
pub mod xmlrpc;
