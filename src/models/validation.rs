use crate::{
    error::ValidationError,
    models::{attendance::AttendanceForm, recipient::RecipientSource},
};

pub fn validate_form(form: &AttendanceForm) -> Result<(), ValidationError> {
    if form.channel_id.trim().is_empty() || form.sector_id.trim().is_empty() {
        return Err(ValidationError::MissingSelection);
    }

    if let RecipientSource::Csv { text } = &form.recipients {
        if text.is_empty() {
            return Err(ValidationError::MissingCsvFile);
        }
    }

    if let Some(template) = form.quick_message_template() {
        if let Some(kind) = template.header_format() {
            if form.media.url_for(kind).is_none() {
                return Err(ValidationError::MissingHeaderMedia(kind));
            }
        }
    }

    Ok(())
}
