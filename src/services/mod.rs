pub mod prepare_service;
pub mod secure;
