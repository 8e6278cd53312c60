pub mod comment;
pub mod doctype;
pub mod element;
pub mod text;
