pub mod character;
pub mod transformation;
