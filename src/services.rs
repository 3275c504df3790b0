pub mod auth;
pub mod klasmat_service;
pub mod notification;
pub mod requisition_service;
pub mod storage;
