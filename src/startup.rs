use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::Settings;
use crate::document_store::DocumentStoreClient;
use crate::mailchimp_client::MailchimpClient;
use crate::routes::{handle_newsletter_stats, handle_subscribe, health_check};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let mailchimp_client = MailchimpClient::new(config.get_mailchimp(), None);
        let document_store = DocumentStoreClient::new(config.get_document_store_base_url(), None);

        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr().unwrap().port();
        let server = run(listener, mailchimp_client, document_store)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    mailchimp_client: MailchimpClient,
    document_store: DocumentStoreClient,
) -> Result<Server, std::io::Error> {
    let mailchimp_client = web::Data::new(mailchimp_client);
    let document_store = web::Data::new(document_store);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(handle_subscribe))
            .route(
                "/newsletter/stats",
                web::get().to(handle_newsletter_stats),
            )
            .app_data(mailchimp_client.clone())
            .app_data(document_store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
