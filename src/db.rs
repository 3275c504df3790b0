pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod requisition_repo;
pub use requisition_repo::{PgRequisitionRepository, RequisitionRepository};
pub mod klasmat_repo;
pub use klasmat_repo::{KlasmatRepository, PgKlasmatRepository};

#[cfg(test)]
pub mod memory;
