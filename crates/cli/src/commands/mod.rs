pub mod images;
pub mod people;
pub mod session;
