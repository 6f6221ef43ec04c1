pub(crate) mod access;
pub(crate) mod admin;
pub(crate) mod error;
pub(crate) mod storage;
pub(crate) mod student;
pub(crate) mod teacher;
