use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use super::{check_status, FormPublisher, GoogleApiError, GoogleWorkspace};

const FORMS_API: &str = "https://forms.googleapis.com/v1/forms";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";

/// What the form-creation service needs: title, price for the confirmation question,
/// and the complete description text.
#[derive(Debug, Clone)]
pub struct EventForm {
    pub title: String,
    pub price: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishedForm {
    pub form_id: String,
    pub edit_url: String,
    pub view_url: String,
}

impl PublishedForm {
    pub fn from_id(form_id: impl Into<String>) -> Self {
        let form_id = form_id.into();
        Self {
            edit_url: format!("https://docs.google.com/forms/d/{form_id}/edit"),
            view_url: format!("https://docs.google.com/forms/d/{form_id}/viewform"),
            form_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedForm {
    form_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct DriveParents {
    #[serde(default)]
    parents: Vec<String>,
}

fn text_question(index: usize, title: &str, description: Option<&str>) -> Value {
    let mut item = json!({
        "title": title,
        "questionItem": { "question": { "required": true, "textQuestion": {} } }
    });
    if let Some(description) = description {
        item["description"] = json!(description);
    }
    json!({ "createItem": { "item": item, "location": { "index": index } } })
}

fn radio_question(index: usize, title: &str, options: &[&str]) -> Value {
    let options: Vec<Value> = options.iter().map(|value| json!({ "value": value })).collect();
    json!({
        "createItem": {
            "item": {
                "title": title,
                "questionItem": {
                    "question": {
                        "required": true,
                        "choiceQuestion": { "type": "RADIO", "options": options }
                    }
                }
            },
            "location": { "index": index }
        }
    })
}

/// The sign-up questions, in display order.
pub fn question_requests(price: &str) -> Vec<Value> {
    let confirmation = format!("Okay - {price}");
    vec![
        radio_question(0, &format!("This event will cost you {price}"), &[confirmation.as_str()]),
        text_question(1, "First Name", None),
        text_question(2, "Last Name", None),
        text_question(
            3,
            "Country of Origin",
            Some("Please start with a capital letter (e.g. Germany)"),
        ),
        text_question(
            4,
            "Phone Number",
            Some("Please follow the pattern (e.g. +49 ..., +38....)"),
        ),
        radio_question(
            5,
            "Do you have a Deutschlandticket for the month the event takes place?",
            &["Yes", "No"],
        ),
        radio_question(
            6,
            "Exchange Type",
            &[
                "Erasmus (Hochschule München!)",
                "Other (Hochschule München!)",
                "Tutor",
            ],
        ),
    ]
}

impl GoogleWorkspace {
    async fn batch_update(
        &self,
        token: &str,
        form_id: &str,
        requests: Vec<Value>,
    ) -> Result<(), GoogleApiError> {
        check_status(
            self.http
                .post(format!("{FORMS_API}/{form_id}:batchUpdate"))
                .bearer_auth(token)
                .json(&json!({ "requests": requests }))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn rename_drive_file(&self, token: &str, file_id: &str, name: &str) -> Result<(), GoogleApiError> {
        check_status(
            self.http
                .patch(format!("{DRIVE_FILES_API}/{file_id}"))
                .query(&[("fields", "id,name")])
                .bearer_auth(token)
                .json(&json!({ "name": name }))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn move_drive_file(&self, token: &str, file_id: &str, folder_id: &str) -> Result<(), GoogleApiError> {
        let current: DriveParents = check_status(
            self.http
                .get(format!("{DRIVE_FILES_API}/{file_id}"))
                .query(&[("fields", "parents")])
                .bearer_auth(token)
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        let remove_parents = current.parents.join(",");
        check_status(
            self.http
                .patch(format!("{DRIVE_FILES_API}/{file_id}"))
                .query(&[
                    ("addParents", folder_id),
                    ("removeParents", remove_parents.as_str()),
                    ("fields", "id,parents"),
                ])
                .bearer_auth(token)
                .json(&json!({}))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl FormPublisher for GoogleWorkspace {
    /// Creates the form, then sets its description and questions. Renaming and moving the
    /// Drive file afterwards only logs warnings on failure.
    async fn publish_form(&self, form: &EventForm) -> Result<PublishedForm, GoogleApiError> {
        let token = self.bearer().await?;

        let created: CreatedForm = check_status(
            self.http
                .post(FORMS_API)
                .bearer_auth(&token)
                .json(&json!({ "info": { "title": form.title } }))
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;
        let published = PublishedForm::from_id(created.form_id);
        log::info!("Created form {} for '{}'", published.form_id, form.title);

        let description = json!({
            "updateFormInfo": {
                "info": { "description": form.description },
                "updateMask": "description"
            }
        });
        self.batch_update(&token, &published.form_id, vec![description])
            .await?;
        self.batch_update(&token, &published.form_id, question_requests(&form.price))
            .await?;

        if let Err(e) = self
            .rename_drive_file(&token, &published.form_id, &form.title)
            .await
        {
            log::warn!("Could not rename form {} in Drive: {}", published.form_id, e);
        }

        match &self.forms_folder_id {
            Some(folder_id) => {
                if let Err(e) = self.move_drive_file(&token, &published.form_id, folder_id).await {
                    log::warn!(
                        "Could not move form {} into folder {}: {}",
                        published.form_id,
                        folder_id,
                        e
                    );
                }
            }
            None => log::debug!("No forms folder configured, leaving form in Drive root"),
        }

        Ok(published)
    }
}
