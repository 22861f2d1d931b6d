use actix_cors::Cors;
use actix_files::Files;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder, Result as ActixResult};
use std::path::PathBuf;
use std::sync::Arc;
use tilecore::{DefinitionStore, DefinitionStores, EventRegistry};
use tilewire::{DefinitionWirer, MountPlan, StaticMount};
use tracing::{error, info};

mod setup;

use setup::{EventManifestSetup, RouteManifestSetup};

/// Application state shared across handlers
struct AppState {
    stores: DefinitionStores,
    registry: Arc<EventRegistry>,
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tileserver"
    }))
}

/// List all tile definitions
#[get("/api/definitions")]
async fn list_definitions(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    match data.stores.tiles.find_all().await {
        Ok(definitions) => Ok(HttpResponse::Ok().json(definitions)),
        Err(e) => {
            error!("failed to list tile definitions: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

/// List all activity-stream definitions
#[get("/api/streams")]
async fn list_streams(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    match data.stores.activity_streams.find_all().await {
        Ok(definitions) => Ok(HttpResponse::Ok().json(definitions)),
        Err(e) => {
            error!("failed to list activity-stream definitions: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

/// List global event names and how many system listeners each has
#[get("/api/events")]
async fn list_events(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let events: Vec<_> = data
        .registry
        .global_events()
        .map(|event| {
            serde_json::json!({
                "event": event,
                "listeners": data.registry.system_listener_count(event),
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(events))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("starting tile host");

    let definitions_root = PathBuf::from(
        std::env::var("DEFINITIONS_DIR").unwrap_or_else(|_| "./definitions".to_string()),
    );

    let stores = DefinitionStores::in_memory();
    let registry = Arc::new(EventRegistry::new());
    let plan = Arc::new(MountPlan::new());

    let wirer = DefinitionWirer::new(
        stores.clone(),
        registry.clone(),
        plan.clone(),
        Arc::new(RouteManifestSetup),
        Arc::new(EventManifestSetup),
    );

    // A broken definition must not run partially; abort startup entirely.
    if let Err(e) = wirer.wire_all_definitions(&definitions_root).await {
        error!("definition setup failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "wired {} definition(s) from {}",
        plan.static_mounts().len(),
        definitions_root.display()
    );

    registry.emit_system("serviceStarted", &serde_json::json!({ "service": "tileserver" }));

    let app_state = web::Data::new(AppState {
        stores,
        registry: registry.clone(),
    });

    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    info!("server starting on http://{}", bind_address);

    let static_mounts = plan.static_mounts();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .service(health_check)
            .service(list_definitions)
            .service(list_streams)
            .service(list_events);

        for mount in &static_mounts {
            app = app.service(static_service(mount));
        }
        app
    })
    .bind(&bind_address)?
    .run()
    .await?;

    registry.emit_system("serviceStopped", &serde_json::json!({ "service": "tileserver" }));

    Ok(())
}

/// Build the file service for one recorded static mount.
fn static_service(mount: &StaticMount) -> Files {
    Files::new(&mount.url_prefix, &mount.dir).index_file("index.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use tempfile::TempDir;
    use tilewire::HostApp;

    #[actix_web::test]
    async fn recorded_mounts_serve_their_public_files() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::write(public.join("app.js"), "console.log('hi');").unwrap();

        let plan = MountPlan::new();
        plan.mount_static("/weather", public);

        let mounts = plan.static_mounts();
        let app =
            test::init_service(App::new().service(static_service(&mounts[0]))).await;

        let req = test::TestRequest::get().uri("/weather/app.js").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
