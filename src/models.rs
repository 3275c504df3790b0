pub mod auth;
pub mod klasmat;
pub mod requisition;
pub mod ut;
