//! Restaurant documents and their embedded reservations: domain, repository, service.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{NewRestaurant, Reservation, ReservationChange, ReservationInput, Restaurant};
pub use repository::DocumentStore;
pub use service::ReservationStore;
