use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{parse_id, NewRestaurant, Reservation, ReservationChange, ReservationInput, Restaurant};
use super::repository::DocumentStore;
use crate::errors::ServiceError;

/// Read-modify-write attempts before a reservation mutation gives up with `Conflict`.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

fn restaurant_not_found() -> ServiceError { ServiceError::not_found("restaurant") }

fn reservation_not_found() -> ServiceError { ServiceError::not_found("reservation") }

/// Restaurant/reservation business service independent of web framework.
///
/// Reservation mutations load the whole restaurant, change the sequence in
/// memory and write it back conditioned on the version that was read. A lost
/// race reloads and re-applies the change.
pub struct ReservationStore {
    store: Arc<dyn DocumentStore>,
}

impl ReservationStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store } }

    #[instrument(skip(self, description))]
    pub async fn create_restaurant(&self, name: &str, description: &str) -> Result<Restaurant, ServiceError> {
        let created = self
            .store
            .insert(NewRestaurant { name: name.to_string(), description: description.to_string() })
            .await?;
        info!(restaurant_id = %created.id, "restaurant_created");
        Ok(created)
    }

    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, ServiceError> {
        self.store.find_all().await
    }

    pub async fn get_restaurant(&self, restaurant_id: &str) -> Result<Restaurant, ServiceError> {
        let id = parse_id(restaurant_id).ok_or_else(restaurant_not_found)?;
        self.load(id).await
    }

    async fn load(&self, id: Uuid) -> Result<Restaurant, ServiceError> {
        self.store.find_one(id).await?.ok_or_else(restaurant_not_found)
    }

    /// Append a reservation and return the restaurant as written together with it.
    ///
    /// # Examples
    /// ```
    /// use service::restaurant::{ReservationInput, ReservationStore};
    /// use service::storage::MemoryDocumentStore;
    /// let store = ReservationStore::new(MemoryDocumentStore::new());
    /// let r = tokio_test::block_on(store.create_restaurant("Pasta House", "Italian")).unwrap();
    /// let input = ReservationInput { time: "18:00".into(), people: 4.into() };
    /// let change = tokio_test::block_on(store.add_reservation(&r.id.to_string(), input)).unwrap();
    /// assert_eq!(change.restaurant.reservations, vec![change.reservation]);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn add_reservation(
        &self,
        restaurant_id: &str,
        input: ReservationInput,
    ) -> Result<ReservationChange, ServiceError> {
        self.mutate(restaurant_id, |restaurant| Ok(restaurant.append_reservation(input.clone())))
            .await
    }

    pub async fn get_reservation(&self, restaurant_id: &str, reservation_id: &str) -> Result<Reservation, ServiceError> {
        let restaurant = self.get_restaurant(restaurant_id).await?;
        parse_id(reservation_id)
            .and_then(|id| restaurant.reservation(id))
            .cloned()
            .ok_or_else(reservation_not_found)
    }

    /// Remove a reservation; the change carries its value before removal.
    #[instrument(skip(self))]
    pub async fn delete_reservation(
        &self,
        restaurant_id: &str,
        reservation_id: &str,
    ) -> Result<ReservationChange, ServiceError> {
        let target = parse_id(reservation_id);
        self.mutate(restaurant_id, |restaurant| {
            target
                .and_then(|id| restaurant.remove_reservation(id))
                .ok_or_else(reservation_not_found)
        })
        .await
    }

    /// Replace `time`/`people` of a reservation in place.
    #[instrument(skip(self, input))]
    pub async fn update_reservation(
        &self,
        restaurant_id: &str,
        reservation_id: &str,
        input: ReservationInput,
    ) -> Result<ReservationChange, ServiceError> {
        let target = parse_id(reservation_id);
        self.mutate(restaurant_id, |restaurant| {
            target
                .and_then(|id| restaurant.update_reservation(id, input.clone()))
                .ok_or_else(reservation_not_found)
        })
        .await
    }

    /// Release the backing store.
    pub async fn close(&self) -> Result<(), ServiceError> {
        self.store.close().await
    }

    async fn mutate<F>(&self, restaurant_id: &str, mut apply: F) -> Result<ReservationChange, ServiceError>
    where
        F: FnMut(&mut Restaurant) -> Result<Reservation, ServiceError> + Send,
    {
        let id = parse_id(restaurant_id).ok_or_else(restaurant_not_found)?;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut restaurant = self.load(id).await?;
            let read_version = restaurant.version;
            let reservation = apply(&mut restaurant)?;

            if self.store.replace_reservations(id, &restaurant.reservations, read_version).await? {
                restaurant.version = read_version + 1;
                debug!(restaurant_id = %id, reservation_id = %reservation.id, version = restaurant.version, "reservations_written");
                return Ok(ReservationChange { restaurant, reservation });
            }
            warn!(restaurant_id = %id, attempt, "reservation write lost a version race");
        }
        Err(ServiceError::Conflict(format!(
            "restaurant {} changed concurrently; gave up after {} attempts",
            id, MAX_WRITE_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDocumentStore;
    use crate::test_support::FlakyStore;
    use serde_json::json;

    fn svc() -> ReservationStore { ReservationStore::new(MemoryDocumentStore::new()) }

    fn input(time: &str, people: i64) -> ReservationInput {
        ReservationInput { time: json!(time), people: json!(people) }
    }

    #[tokio::test]
    async fn create_then_get_restaurant() -> Result<(), anyhow::Error> {
        let svc = svc();
        let created = svc.create_restaurant("Pasta House", "Italian").await?;
        let found = svc.get_restaurant(&created.id.to_string()).await?;
        assert_eq!(found.name, "Pasta House");
        assert_eq!(found.description, "Italian");
        assert!(found.reservations.is_empty());
        assert_eq!(found, created);
        Ok(())
    }

    #[tokio::test]
    async fn list_is_empty_then_in_creation_order() -> Result<(), anyhow::Error> {
        let svc = svc();
        assert!(svc.list_restaurants().await?.is_empty());
        let a = svc.create_restaurant("A", "a").await?;
        let b = svc.create_restaurant("B", "b").await?;
        let ids: Vec<Uuid> = svc.list_restaurants().await?.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_or_malformed_restaurant_is_not_found() {
        let svc = svc();
        for id in [Uuid::new_v4().to_string(), "garbage".to_string(), String::new()] {
            assert!(matches!(svc.get_restaurant(&id).await, Err(ServiceError::NotFound(ref m)) if m == "restaurant not found"));
            assert!(matches!(svc.add_reservation(&id, input("18:00", 2)).await, Err(ServiceError::NotFound(_))));
            assert!(matches!(svc.get_reservation(&id, &Uuid::new_v4().to_string()).await, Err(ServiceError::NotFound(ref m)) if m == "restaurant not found"));
        }
    }

    #[tokio::test]
    async fn add_appends_exactly_one_with_fresh_id() -> Result<(), anyhow::Error> {
        let svc = svc();
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();
        let first = svc.add_reservation(&rid, input("18:00", 4)).await?;
        let second = svc.add_reservation(&rid, input("19:00", 2)).await?;

        assert_eq!(second.restaurant.reservations.len(), 2);
        assert_eq!(second.restaurant.reservations.last(), Some(&second.reservation));
        assert_ne!(first.reservation.id, second.reservation.id);
        assert_eq!(second.restaurant.version, 2);
        // returned restaurant matches what was stored
        assert_eq!(svc.get_restaurant(&rid).await?, second.restaurant);
        Ok(())
    }

    #[tokio::test]
    async fn get_reservation_is_idempotent() -> Result<(), anyhow::Error> {
        let svc = svc();
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();
        let added = svc.add_reservation(&rid, input("18:00", 4)).await?;
        let resv_id = added.reservation.id.to_string();
        let a = svc.get_reservation(&rid, &resv_id).await?;
        let b = svc.get_reservation(&rid, &resv_id).await?;
        assert_eq!(a, b);
        assert_eq!(a, added.reservation);
        assert!(matches!(svc.get_reservation(&rid, "nope").await, Err(ServiceError::NotFound(ref m)) if m == "reservation not found"));
        Ok(())
    }

    #[tokio::test]
    async fn update_preserves_positions_and_ids() -> Result<(), anyhow::Error> {
        let svc = svc();
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();
        svc.add_reservation(&rid, input("17:00", 1)).await?;
        let mid = svc.add_reservation(&rid, input("18:00", 4)).await?;
        let before = svc.add_reservation(&rid, input("20:00", 8)).await?.restaurant;

        let changed = svc.update_reservation(&rid, &mid.reservation.id.to_string(), input("19:00", 2)).await?;
        assert_eq!(changed.reservation.id, mid.reservation.id);
        assert_eq!(changed.reservation.time, json!("19:00"));
        assert_eq!(changed.reservation.people, json!(2));

        let after = changed.restaurant.reservations;
        assert_eq!(after.len(), before.reservations.len());
        for (i, (old, new)) in before.reservations.iter().zip(after.iter()).enumerate() {
            assert_eq!(old.id, new.id);
            if i != 1 {
                assert_eq!(old, new);
            }
        }
        assert_eq!(after[1], changed.reservation);
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> Result<(), anyhow::Error> {
        let svc = svc();
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();
        let keep = svc.add_reservation(&rid, input("17:00", 1)).await?.reservation;
        let gone = svc.add_reservation(&rid, input("18:00", 4)).await?.reservation;
        let gone_id = gone.id.to_string();

        let removed = svc.delete_reservation(&rid, &gone_id).await?;
        assert_eq!(removed.reservation, gone);
        assert_eq!(removed.restaurant.reservations, vec![keep]);
        assert!(matches!(svc.get_reservation(&rid, &gone_id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_reservation(&rid, &gone_id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_of_unknown_reservation_is_not_found() -> Result<(), anyhow::Error> {
        let svc = svc();
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();
        let kept = svc.add_reservation(&rid, input("18:00", 4)).await?.reservation;

        for resv_id in [Uuid::new_v4().to_string(), "garbage".to_string()] {
            let res = svc.update_reservation(&rid, &resv_id, input("19:00", 2)).await;
            assert!(matches!(res, Err(ServiceError::NotFound(ref m)) if m == "reservation not found"));
        }
        let stored = svc.get_restaurant(&rid).await?;
        assert_eq!(stored.reservations, vec![kept]);
        assert_eq!(stored.version, 1);
        Ok(())
    }

    #[tokio::test]
    async fn pasta_house_scenario() -> Result<(), anyhow::Error> {
        let svc = svc();
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        assert!(r.reservations.is_empty());
        let rid = r.id.to_string();

        let added = svc.add_reservation(&rid, input("18:00", 4)).await?;
        let x = added.reservation.id;
        assert_eq!(added.restaurant.reservations, vec![Reservation { id: x, time: json!("18:00"), people: json!(4) }]);

        let updated = svc.update_reservation(&rid, &x.to_string(), input("19:00", 2)).await?;
        assert_eq!(updated.reservation, Reservation { id: x, time: json!("19:00"), people: json!(2) });
        assert_eq!(updated.restaurant.reservations.len(), 1);
        assert_eq!(updated.restaurant.reservations[0].id, x);

        let deleted = svc.delete_reservation(&rid, &x.to_string()).await?;
        assert!(deleted.restaurant.reservations.is_empty());
        assert!(matches!(svc.get_reservation(&rid, &x.to_string()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_is_not_applied() -> Result<(), anyhow::Error> {
        let store = FlakyStore::new();
        let svc = ReservationStore::new(store.clone());
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();
        let kept = svc.add_reservation(&rid, input("18:00", 4)).await?.reservation;

        store.fail_writes(true);
        assert!(matches!(svc.add_reservation(&rid, input("19:00", 2)).await, Err(ServiceError::Persistence(_))));
        assert!(matches!(svc.update_reservation(&rid, &kept.id.to_string(), input("20:00", 1)).await, Err(ServiceError::Persistence(_))));
        assert!(matches!(svc.delete_reservation(&rid, &kept.id.to_string()).await, Err(ServiceError::Persistence(_))));
        assert!(matches!(svc.create_restaurant("B", "b").await, Err(ServiceError::Persistence(_))));

        store.fail_writes(false);
        let stored = svc.get_restaurant(&rid).await?;
        assert_eq!(stored.reservations, vec![kept]);
        assert_eq!(stored.version, 1);
        Ok(())
    }

    #[tokio::test]
    async fn lost_race_is_retried() -> Result<(), anyhow::Error> {
        let store = FlakyStore::new();
        let svc = ReservationStore::new(store.clone());
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();

        store.lose_races(1);
        let added = svc.add_reservation(&rid, input("18:00", 4)).await?;
        assert_eq!(added.restaurant.reservations.len(), 1);
        // one bump from the interloper, one from our write
        assert_eq!(added.restaurant.version, 2);
        assert_eq!(svc.get_restaurant(&rid).await?, added.restaurant);
        Ok(())
    }

    #[tokio::test]
    async fn persistent_contention_is_a_conflict() -> Result<(), anyhow::Error> {
        let store = FlakyStore::new();
        let svc = ReservationStore::new(store.clone());
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();

        store.lose_races(MAX_WRITE_ATTEMPTS);
        assert!(matches!(svc.add_reservation(&rid, input("18:00", 4)).await, Err(ServiceError::Conflict(_))));
        assert!(svc.get_restaurant(&rid).await?.reservations.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_adds_are_not_lost() -> Result<(), anyhow::Error> {
        let svc = Arc::new(svc());
        let r = svc.create_restaurant("Pasta House", "Italian").await?;
        let rid = r.id.to_string();

        let mut handles = Vec::new();
        for i in 0..2 {
            let svc = Arc::clone(&svc);
            let rid = rid.clone();
            handles.push(tokio::spawn(async move { svc.add_reservation(&rid, input("18:00", i)).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(svc.get_restaurant(&rid).await?.reservations.len(), 2);
        Ok(())
    }
}
