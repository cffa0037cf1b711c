//! Routes that only exist on development deployments.

use rocket::Route;

use crate::error::Result;
use crate::guard::{is_development_mode, Authorizer};
use crate::model::api::Envelope;

pub fn routes() -> Vec<Route> {
    routes![ping]
}

#[get("/dev/ping")]
async fn ping(auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_development_mode()).await?;
    Envelope::with_data(&"pong")
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client, serde::json::Value};

    use crate::api::test_utils::get;

    #[backend_test]
    async fn ping_in_development(client: Client) {
        assert_eq!(get(&client, "/api/dev/ping").await, Value::from("pong"));
    }

    #[rocket::async_test]
    async fn ping_refused_in_production() {
        let figment = crate::config::test_figment().merge(("development_mode", false));
        let store = std::sync::Arc::new(crate::store::MemoryStore::new());
        let rocket = crate::rocket_with_store(rocket::custom(figment), store);
        let client = Client::tracked(rocket).await.unwrap();

        let response = client.get("/api/dev/ping").dispatch().await;
        let error = crate::api::test_utils::error(response, Status::InternalServerError).await;
        assert_eq!(error, "App is not running in development mode.");
    }
}
