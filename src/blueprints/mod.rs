//! Blueprint sources, the init descriptor, run order, and blueprint decoding.
pub mod git;
pub mod init;
pub mod order;
pub mod packages;
pub mod source;
