//! Domain layer: view models, raw WordPress shapes and the transform boundary.

pub mod entities;
pub mod error;
pub mod text;
pub mod transform;
pub mod wp;
