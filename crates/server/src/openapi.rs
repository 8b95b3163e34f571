use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(ToSchema)]
pub struct CreateRestaurantDoc { pub name: String, pub description: String }

/// `time` and `people` are stored verbatim; a missing field becomes `null`.
#[derive(ToSchema)]
pub struct ReservationInputDoc {
    #[schema(value_type = Object)]
    pub time: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub people: Option<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct ReservationDoc {
    pub id: Uuid,
    #[schema(value_type = Object)]
    pub time: serde_json::Value,
    #[schema(value_type = Object)]
    pub people: serde_json::Value,
}

#[derive(ToSchema)]
pub struct RestaurantDoc {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub reservations: Vec<ReservationDoc>,
    pub version: i64,
}

#[derive(ToSchema)]
pub struct ReservationChangeDoc {
    pub restaurant: RestaurantDoc,
    pub reservation: ReservationDoc,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::restaurants::create_restaurant,
        crate::routes::restaurants::list_restaurants,
        crate::routes::restaurants::get_restaurant,
        crate::routes::restaurants::add_reservation,
        crate::routes::restaurants::get_reservation,
        crate::routes::restaurants::delete_reservation,
        crate::routes::restaurants::update_reservation,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            CreateRestaurantDoc,
            ReservationInputDoc,
            ReservationDoc,
            RestaurantDoc,
            ReservationChangeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "restaurants"),
        (name = "reservations")
    )
)]
pub struct ApiDoc;
