pub mod first_name;
pub mod new_subscriber;
pub mod subscriber_email;
