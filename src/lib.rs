use services::sentiment::SentimentClient;

pub mod config;
pub mod modules;
pub mod services;

#[derive(Clone)]
pub struct AppState {
    pub sentiment: SentimentClient,
}
