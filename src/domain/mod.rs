pub mod document;
pub mod anchor;
pub mod boundary;
pub mod guard;
pub mod snippet;
pub mod imports;
pub mod category;
pub mod request;
pub mod patcher;
pub mod ports;
