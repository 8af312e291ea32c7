use serde::Deserialize;

use crate::domain::first_name::FirstName;
use crate::domain::subscriber_email::SubscriberEmail;

pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub first_name: FirstName,
}

#[derive(Deserialize)]
pub struct NewSubscriberBody {
    pub email: String,
    // The field is optional in the public API and defaults to an empty string.
    #[serde(rename = "firstName", default)]
    pub first_name: String,
}

impl TryFrom<&NewSubscriberBody> for NewSubscriber {
    type Error = String;

    fn try_from(body: &NewSubscriberBody) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(body.email.clone())?;
        let first_name = FirstName::parse(body.first_name.clone())?;

        Ok(NewSubscriber { email, first_name })
    }
}
