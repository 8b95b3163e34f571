use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// One booking embedded in a restaurant. `time` and `people` are stored as given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub time: JsonValue,
    pub people: JsonValue,
}

/// Body of add/update reservation requests. Absent fields become `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReservationInput {
    #[serde(default)]
    pub time: JsonValue,
    #[serde(default)]
    pub people: JsonValue,
}

/// Create-restaurant input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
}

/// Restaurant document with its ordered reservation sequence.
///
/// `version` counts successful reservation writes and is what the
/// conditional rewrite compares against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
    #[serde(default)]
    pub version: i64,
}

/// Result of a reservation mutation: the parent as written plus the touched entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationChange {
    pub restaurant: Restaurant,
    pub reservation: Reservation,
}

/// Parse an opaque path identifier. Anything that is not a UUID cannot name a document.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

impl Restaurant {
    /// Fresh document with a new id, no reservations, version 0.
    pub fn new(input: NewRestaurant) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            reservations: Vec::new(),
            version: 0,
        }
    }

    /// First reservation with this id in sequence order.
    pub fn reservation(&self, id: Uuid) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    fn position_of(&self, id: Uuid) -> Option<usize> {
        self.reservations.iter().position(|r| r.id == id)
    }

    /// Append a reservation at the end under an id not yet used in this restaurant.
    pub fn append_reservation(&mut self, input: ReservationInput) -> Reservation {
        let mut id = Uuid::new_v4();
        while self.position_of(id).is_some() {
            id = Uuid::new_v4();
        }
        let reservation = Reservation { id, time: input.time, people: input.people };
        self.reservations.push(reservation.clone());
        reservation
    }

    /// Remove the first entry with this id and return it.
    ///
    /// Ids are unique per restaurant, so a second match means the document is
    /// already corrupt; only the first one is removed and reported, the rest
    /// are left in place.
    pub fn remove_reservation(&mut self, id: Uuid) -> Option<Reservation> {
        let pos = self.position_of(id)?;
        Some(self.reservations.remove(pos))
    }

    /// Overwrite `time`/`people` of the first entry with this id, keeping its
    /// id and its position in the sequence.
    pub fn update_reservation(&mut self, id: Uuid, input: ReservationInput) -> Option<Reservation> {
        let pos = self.position_of(id)?;
        let entry = &mut self.reservations[pos];
        entry.time = input.time;
        entry.people = input.people;
        Some(entry.clone())
    }
}
