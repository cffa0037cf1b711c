use rocket::{
    http::Status,
    serde::json::{serde_json, serde_json::Map, Value},
    Catcher, Request, Route,
};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::guard::Authorizer;
use crate::lookup::validate_id;
use crate::model::{
    api::{create_model, is_empty_object, Reply},
    mongodb::Id,
};
use crate::store::Collection;

mod dev;
mod groups;
mod polls;
mod users;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(users::routes());
    routes.extend(groups::routes());
    routes.extend(polls::routes());
    routes.extend(dev::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Anything Rocket itself refuses (unknown routes, unparseable bodies) still
/// gets a failure envelope.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> Reply {
    Reply::failure(status, status.reason().unwrap_or("Unknown error"))
}

/// Resolve an ID taken from the URI, answering 404 if there is no such document.
async fn resolve(auth: &Authorizer<'_>, collection: Collection, raw: &str) -> Result<Id> {
    validate_id(auth.store(), collection, raw)
        .await
        .ok_or_else(|| Error::not_found(collection.kind()))
}

/// Read a partial edit: `body` is projected onto the editable fields in
/// `schema`, so fields it leaves out keep their current values and fields it
/// adds are ignored.
fn read_edit<T: DeserializeOwned>(schema: Map<String, Value>, body: &Value) -> Result<T> {
    if !body.is_object() || is_empty_object(body) {
        return Err(Error::bad_request("Nothing to edit"));
    }
    let model = create_model(&schema, body);
    serde_json::from_value(Value::Object(model)).map_err(|e| {
        debug!("Rejecting edit: {e}");
        Error::bad_request("Invalid fields")
    })
}

#[cfg(test)]
mod test_utils {
    use rocket::{
        http::Status,
        local::asynchronous::{Client, LocalResponse},
        serde::json::Value,
    };
    use serde::Serialize;

    use crate::model::api::{Envelope, ResultKind};

    /// Read a response as an envelope, checking its status and discriminator.
    pub async fn envelope(response: LocalResponse<'_>, status: Status) -> Envelope {
        assert_eq!(status, response.status());
        let envelope: Envelope = response.into_json().await.unwrap();
        let expected = if status.class().is_success() {
            ResultKind::Success
        } else {
            ResultKind::Failure
        };
        assert_eq!(expected, envelope.result);
        envelope
    }

    /// The `data` of a successful reply.
    pub async fn data(response: LocalResponse<'_>) -> Value {
        envelope(response, Status::Ok).await.data.unwrap_or(Value::Null)
    }

    /// The `error` of a failed reply with the given status.
    pub async fn error(response: LocalResponse<'_>, status: Status) -> String {
        envelope(response, status).await.error.unwrap()
    }

    pub async fn post_json<T: Serialize>(client: &Client, uri: &str, body: &T) -> Value {
        data(client.post(uri).json(body).dispatch().await).await
    }

    pub async fn get(client: &Client, uri: &str) -> Value {
        data(client.get(uri).dispatch().await).await
    }

    /// A string field of a JSON object.
    pub fn str_field(value: &Value, field: &str) -> String {
        value[field].as_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::test_utils::error;
    use super::*;

    #[backend_test]
    async fn unknown_api_routes_get_envelopes(client: Client) {
        let response = client.get("/api/nowhere").dispatch().await;
        assert_eq!(error(response, Status::NotFound).await, "Not Found");
    }

    #[backend_test]
    async fn unparseable_bodies_get_envelopes(client: Client) {
        let response = client
            .post("/api/users/register")
            .header(rocket::http::ContentType::JSON)
            .body("{ not json")
            .dispatch()
            .await;
        assert_eq!(error(response, Status::BadRequest).await, "Bad Request");
    }

    #[test]
    fn edits_are_projected() {
        let mut schema = Map::new();
        schema.insert("name".to_string(), Value::from("old"));
        schema.insert("description".to_string(), Value::from("kept"));

        let body = rocket::serde::json::json!({"name": "new", "admins": ["me"]});
        let edited: Map<String, Value> = read_edit(schema.clone(), &body).unwrap();
        assert_eq!(edited["name"], "new");
        assert_eq!(edited["description"], "kept");
        assert!(!edited.contains_key("admins"));

        let empty = rocket::serde::json::json!({});
        assert!(read_edit::<Map<String, Value>>(schema.clone(), &empty).is_err());
        assert!(read_edit::<Map<String, Value>>(schema, &Value::from(3)).is_err());
    }
}
