//! Event invitation: the sign-up form text and the matching WhatsApp message.

pub mod handlers;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::google::{EventForm, PublishedForm};
use crate::validation::{validate_required, ValidationErrors, Validator};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InvitationRequest {
    pub title: String,
    /// Event-specific information shown in the form and the message.
    pub event_text: String,
    pub date_time: String,
    pub price: String,
    pub location: String,
}

impl Validator for InvitationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.title, "title", "Event title", &mut errors);
        validate_required(&self.event_text, "event_text", "Event text", &mut errors);
        validate_required(&self.date_time, "date_time", "Date and time", &mut errors);
        validate_required(&self.price, "price", "Price", &mut errors);
        validate_required(&self.location, "location", "Location", &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvitationResponse {
    pub form: PublishedForm,
    pub whatsapp_message: String,
}

impl InvitationRequest {
    /// Full description of the sign-up form.
    pub fn form_description(&self) -> String {
        format!(
            "Please fill out the form to sign up for the event. Only after your payment you are fully signed up!

ONLY HOCHSCHULE MÜNCHEN INTERNATIONAL STUDENTS CAN REGISTER (Also if you study full-time at MUAS)!
Only after your payment you are fully signed up!
Payment by Credit Card is not possible. If you wish to pay in cash, please text the tutor that posted the event and something can be arranged.
Unfortunately we can not offer you any refund if you don't participate in the event.

EVENT INFORMATION:
{text}

\u{1F4C5} Event date: {date}
\u{1F4B5} Price: {price}
\u{1F3E1} Location: {location}

DATA PRIVACY NOTICE:
By submitting this form, you agree that we process the data you provide for the purpose of event planning. This includes storing and using your personal information for communication related to the event. Your data will only be accessible to the event organizers for this purpose.

Please confirm your consent to this processing by checking the box below.

(If you do not agree to this processing, please inform the event organiser (the person who posted the event text in the WhatsApp group) and you can still sign up for the event in another way.)
",
            text = self.event_text.trim(),
            date = self.date_time.trim(),
            price = self.price.trim(),
            location = self.location.trim(),
        )
    }

    pub fn event_form(&self) -> EventForm {
        EventForm {
            title: self.title.trim().to_string(),
            price: self.price.trim().to_string(),
            description: self.form_description(),
        }
    }

    /// Invitation text for the WhatsApp group, linking the form's view URL.
    pub fn whatsapp_message(&self, view_url: &str) -> String {
        format!(
            "\u{1F680} *{title}* \u{1F680}
{text}
\u{1F4C5} *Event-Date:* {date}
\u{1F4B5} *Price:* {price}
\u{1F3E1} *Location:* {location}
Register here: {view_url}
See you there! \u{2728}
Your International Club Team",
            title = self.title.trim(),
            text = self.event_text.trim(),
            date = self.date_time.trim(),
            price = self.price.trim(),
            location = self.location.trim(),
        )
    }
}
