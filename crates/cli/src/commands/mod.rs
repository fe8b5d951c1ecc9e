pub mod claims;
pub mod model;
