pub mod compare;
pub mod init;
pub mod norms;
pub mod score;
pub mod validate;
