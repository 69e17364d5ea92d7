pub mod customer;
pub mod validation;
