pub mod image_store;
pub mod recognizer;
