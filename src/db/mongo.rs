use log::{info, warn};
use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Database, IndexModel,
};
use std::time::Duration;

use crate::models::itinerary::Itinerary;
use crate::models::user::User;

pub const USERS: &str = "users";
pub const ITINERARIES: &str = "itineraries";

pub async fn create_mongo_client(uri: &str) -> mongodb::error::Result<Client> {
    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.app_name = Some("travel-buddy-api".to_string());
    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal; the driver reconnects on demand.
    match client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
    {
        Ok(_) => info!("Connected to MongoDB"),
        Err(e) => warn!("Connected to MongoDB but ping failed: {}", e),
    }

    Ok(client)
}

/// Creates the indexes the stores rely on. Failures are logged and skipped.
pub async fn ensure_indexes(db: &Database) {
    let users = db.collection::<User>(USERS);
    let unique_email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    for index in [unique_email, IndexModel::builder().keys(doc! { "created_at": 1 }).build()] {
        if let Err(e) = users.create_index(index).await {
            warn!("Could not create user index: {}", e);
        }
    }

    let itineraries = db.collection::<Itinerary>(ITINERARIES);
    let indexes = [
        doc! { "user_id": 1 },
        doc! { "destination": 1 },
        doc! { "created_at": 1 },
        doc! { "user_id": 1, "created_at": -1 },
    ];
    for keys in indexes {
        if let Err(e) = itineraries
            .create_index(IndexModel::builder().keys(keys).build())
            .await
        {
            warn!("Could not create itinerary index: {}", e);
        }
    }
}
