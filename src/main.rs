use log::{error, info, LevelFilter};
use thiserror::Error;

/// Why the server stopped.
#[derive(Debug, Error)]
enum Error {
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
    #[error(transparent)]
    Rocket(#[from] rocket::Error),
}

async fn serve() -> Result<(), Error> {
    info!("Starting Poll Buddy backend...");
    let rocket = pollbuddy_backend::build().ignite().await?;
    // Rocket's own chatter is only useful while igniting.
    log4rs_dynamic_filters::DynamicLevelFilter::set("rocket", LevelFilter::Off);
    let _ = rocket.launch().await?;
    info!("Poll Buddy backend stopped");
    Ok(())
}

#[rocket::main]
async fn main() {
    if let Err(err) = log4rs::init_file("log4rs.yaml", log4rs_dynamic_filters::default_deserializers()) {
        eprintln!("{}", Error::Logging(err.to_string()));
        std::process::exit(1);
    }

    if let Err(err) = serve().await {
        error!("{err}");
        error!("Critical failure, shutting down");
        std::process::exit(1)
    }
}
