use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use service::restaurant::{Reservation, ReservationChange, ReservationInput, Restaurant};

use crate::{errors::ApiError, state::ServerState};

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantInput {
    pub name: String,
    pub description: String,
}

#[utoipa::path(
    post, path = "/restaurants", tag = "restaurants",
    request_body = crate::openapi::CreateRestaurantDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::RestaurantDoc),
        (status = 422, description = "Malformed body", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Could not add new restaurant.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_restaurant(
    State(state): State<ServerState>,
    payload: Result<Json<CreateRestaurantInput>, JsonRejection>,
) -> Result<Json<Restaurant>, ApiError> {
    let Json(input) = payload?;
    let created = state
        .reservations
        .create_restaurant(&input.name, &input.description)
        .await
        .map_err(|e| ApiError::from_service(e, "Could not add new restaurant."))?;
    Ok(Json(created))
}

#[utoipa::path(
    get, path = "/restaurants", tag = "restaurants",
    responses(
        (status = 200, description = "All restaurants in creation order", body = [crate::openapi::RestaurantDoc]),
        (status = 500, description = "Could not fetch restaurants.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_restaurants(State(state): State<ServerState>) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let list = state
        .reservations
        .list_restaurants()
        .await
        .map_err(|e| ApiError::from_service(e, "Could not fetch restaurants."))?;
    info!(count = list.len(), "list restaurants");
    Ok(Json(list))
}

#[utoipa::path(
    get, path = "/restaurants/{id}", tag = "restaurants",
    params(("id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::RestaurantDoc),
        (status = 404, description = "Restaurant not found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Server error. Could not fetch restaurant.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_restaurant(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, ApiError> {
    state
        .reservations
        .get_restaurant(&id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Server error. Could not fetch restaurant."))
}

#[utoipa::path(
    post, path = "/restaurants/{id}", tag = "reservations",
    params(("id" = String, Path, description = "Restaurant id")),
    request_body = crate::openapi::ReservationInputDoc,
    responses(
        (status = 200, description = "Reservation appended", body = crate::openapi::ReservationChangeDoc),
        (status = 404, description = "Restaurant not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Concurrent writes kept winning", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Malformed body", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Could not update reservations. Reservation not added.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn add_reservation(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ReservationInput>, JsonRejection>,
) -> Result<Json<ReservationChange>, ApiError> {
    let Json(input) = payload?;
    state
        .reservations
        .add_reservation(&id, input)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Could not update reservations. Reservation not added."))
}

#[utoipa::path(
    get, path = "/restaurants/{id}/{resv_id}", tag = "reservations",
    params(
        ("id" = String, Path, description = "Restaurant id"),
        ("resv_id" = String, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ReservationDoc),
        (status = 404, description = "Restaurant or reservation not found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Server error. Could not fetch restaurant.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_reservation(
    State(state): State<ServerState>,
    Path((id, resv_id)): Path<(String, String)>,
) -> Result<Json<Reservation>, ApiError> {
    state
        .reservations
        .get_reservation(&id, &resv_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Server error. Could not fetch restaurant."))
}

#[utoipa::path(
    delete, path = "/restaurants/{id}/{resv_id}", tag = "reservations",
    params(
        ("id" = String, Path, description = "Restaurant id"),
        ("resv_id" = String, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Removed; body carries the reservation as it was", body = crate::openapi::ReservationChangeDoc),
        (status = 404, description = "Restaurant or reservation not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Concurrent writes kept winning", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Server error. Could not delete reservation.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete_reservation(
    State(state): State<ServerState>,
    Path((id, resv_id)): Path<(String, String)>,
) -> Result<Json<ReservationChange>, ApiError> {
    state
        .reservations
        .delete_reservation(&id, &resv_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Server error. Could not delete reservation."))
}

#[utoipa::path(
    patch, path = "/restaurants/{id}/{resv_id}", tag = "reservations",
    params(
        ("id" = String, Path, description = "Restaurant id"),
        ("resv_id" = String, Path, description = "Reservation id")
    ),
    request_body = crate::openapi::ReservationInputDoc,
    responses(
        (status = 200, description = "Updated in place", body = crate::openapi::ReservationChangeDoc),
        (status = 404, description = "Restaurant or reservation not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Concurrent writes kept winning", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Malformed body", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Server error. Could not update reservation.", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update_reservation(
    State(state): State<ServerState>,
    Path((id, resv_id)): Path<(String, String)>,
    payload: Result<Json<ReservationInput>, JsonRejection>,
) -> Result<Json<ReservationChange>, ApiError> {
    let Json(input) = payload?;
    state
        .reservations
        .update_reservation(&id, &resv_id, input)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, "Server error. Could not update reservation."))
}
