//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a transaction executor, for composable balance
//! mutations) as the first argument. Every write to
//! `interventions.remaining_amount` goes through
//! [`InterventionRepo::reserve`] / [`InterventionRepo::release`].

pub mod claim_repo;
pub mod domain_repo;
pub mod intervention_repo;
pub mod notification_repo;
pub mod partnership_repo;
pub mod transfer_repo;

pub use claim_repo::{ClaimOutcome, ClaimRepo};
pub use domain_repo::DomainRepo;
pub use intervention_repo::InterventionRepo;
pub use notification_repo::NotificationRepo;
pub use partnership_repo::PartnershipRepo;
pub use transfer_repo::{TransferOutcome, TransferRepo};
