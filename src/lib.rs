#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod site;
pub mod store;

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;
use store::Store;

/// The server as deployed: configured from the environment and backed by MongoDB.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build()).attach(DatabaseFairing)
}

/// The server over an already constructed store.
pub fn rocket_with_store(rocket: Rocket<Build>, store: Store) -> Rocket<Build> {
    assemble(rocket).manage(store)
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/api", api::routes())
        .mount("/", site::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
}
