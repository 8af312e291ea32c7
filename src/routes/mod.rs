mod health_check;
mod newsletter_stats;
mod subscriptions;

pub use health_check::health_check;
pub use newsletter_stats::{handle_newsletter_stats, NewsletterStats, StatsError};
pub use subscriptions::{handle_subscribe, SubscribeError, SubscriptionResult};
