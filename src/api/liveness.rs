use crate::utils::AppError;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use std::sync::mpsc;
use std::thread;

pub const LIVENESS_BODY: &str = "Bot is alive!";

/// GET / - static answer for uptime monitors
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(LIVENESS_BODY)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(liveness));
}

/// Serves the liveness route from its own thread and actix system, apart
/// from the bot runtime. Returns once the socket is bound.
pub fn spawn_liveness_server(host: &str, port: u16) -> Result<thread::JoinHandle<()>, AppError> {
    let host = host.to_string();
    let (bound_tx, bound_rx) = mpsc::channel::<std::io::Result<()>>();

    let handle = thread::Builder::new()
        .name("liveness".to_string())
        .spawn(move || {
            let system = actix_rt::System::new();
            system.block_on(async move {
                let server = HttpServer::new(|| {
                    App::new()
                        .wrap(Logger::default())
                        .configure(configure)
                })
                .workers(1)
                .disable_signals()
                .bind((host.as_str(), port));

                let server = match server {
                    Ok(server) => {
                        let _ = bound_tx.send(Ok(()));
                        server
                    }
                    Err(e) => {
                        let _ = bound_tx.send(Err(e));
                        return;
                    }
                };

                log::info!("💓 Liveness endpoint listening on {}:{}", host, port);

                if let Err(e) = server.run().await {
                    log::error!("❌ Liveness server stopped: {}", e);
                }
            });
        })?;

    match bound_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => Err(AppError::Io(format!("Failed to bind liveness server: {}", e))),
        Err(_) => Err(AppError::Io("Liveness thread exited before binding".to_string())),
    }
}
