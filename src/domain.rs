pub mod currency;
pub mod lifecycle;
pub mod roles;
pub mod validation;
pub mod visibility;
