use crate::core::domain::Identifiable;

pub mod domain;
pub mod dto;
pub mod factory;
pub mod repository;

// Member is the read-only view of a library member the lending rules depend on
pub(crate) trait Member: Identifiable {
    fn external_id(&self) -> &str;
    fn category(&self) -> &str;
    fn is_active(&self) -> bool;
    fn is_sanctioned(&self) -> bool;
    fn has_overdue(&self) -> bool;
}
