// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod comment;
pub mod photo;
pub mod tag;
pub mod user;

pub use comment::*;
pub use photo::*;
pub use tag::*;
pub use user::*;
