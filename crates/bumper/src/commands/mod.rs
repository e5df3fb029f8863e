//! Command implementations

pub mod check;

pub mod doctor;

pub mod info;

pub mod init;
