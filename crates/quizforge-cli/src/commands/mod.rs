pub mod compare;
pub mod init;
pub mod review;
pub mod run;
pub mod validate;
