//! # Domain Module
//!
//! Business logic for match registration. Services receive their storage as an
//! `Arc<dyn Storage>` and never touch HTTP types; the REST layer maps shared
//! DTOs to the commands in [`commands`].
//!
//! - **admission_controller.rs** - admits children to matches and cancels registrations
//! - **capacity_ledger.rs** - read-side capacity queries and the enrollment audit
//! - **notification_service.rs** - builds and sends parent notifications
//! - **child_service.rs**, **parent_service.rs**, **match_service.rs**,
//!   **registration_service.rs** - profile, schedule and dashboard operations
//! - **contact_service.rs** - stores contact form messages

pub mod admission_controller;
pub mod capacity_ledger;
pub mod child_service;
pub mod clock;
pub mod commands;
pub mod contact_service;
pub mod match_service;
pub mod models;
pub mod notification_service;
pub mod parent_service;
pub mod registration_service;

pub use admission_controller::{AdmissionController, DEFAULT_MAX_RETRIES};
pub use capacity_ledger::CapacityLedger;
pub use child_service::ChildService;
pub use clock::{Clock, SystemClock};
pub use contact_service::ContactService;
pub use match_service::MatchService;
pub use notification_service::{LogNotifier, NotificationService, Notifier};
pub use parent_service::ParentService;
pub use registration_service::RegistrationService;
