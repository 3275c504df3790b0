pub mod auth;
pub mod finance;
pub mod klasmat;
pub mod requisitions;
pub mod users;
pub mod uts;
