use super::html::{attr, collapsed_text, select_all, select_doc};
use crate::results::{FormData, FormFieldData};
use scraper::{ElementRef, Html};

/// Every `form` with its input / select / textarea fields
pub fn forms(doc: &Html) -> Vec<FormData> {
    select_doc(doc, "form")
        .into_iter()
        .map(|form| FormData {
            id: attr(form, "id"),
            action: attr(form, "action"),
            method: attr(form, "method")
                .map(|m| m.to_ascii_uppercase())
                .unwrap_or_else(|| "GET".to_string()),
            fields: select_all(form, "input, select, textarea")
                .into_iter()
                .map(|field| form_field(doc, field))
                .collect(),
        })
        .collect()
}

fn form_field(doc: &Html, field: ElementRef<'_>) -> FormFieldData {
    let tag = field.value().name();
    let field_type = match tag {
        "input" => attr(field, "type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string()),
        other => other.to_string(),
    };
    let value = match tag {
        "textarea" => Some(field.text().collect::<String>()).filter(|v| !v.is_empty()),
        _ => field.value().attr("value").map(str::to_string),
    };
    let options = if tag == "select" {
        select_all(field, "option")
            .into_iter()
            .map(collapsed_text)
            .collect()
    } else {
        Vec::new()
    };

    FormFieldData {
        name: attr(field, "name"),
        field_type,
        required: field.value().attr("required").is_some(),
        placeholder: attr(field, "placeholder"),
        value,
        label: label_for(doc, field),
        options,
    }
}

/// First label associated with `field`: `label[for=id]`, else a wrapping label
fn label_for(doc: &Html, field: ElementRef<'_>) -> Option<String> {
    if let Some(id) = field.value().attr("id") {
        let explicit = select_doc(doc, "label[for]")
            .into_iter()
            .find(|label| label.value().attr("for") == Some(id));
        if let Some(label) = explicit {
            return Some(collapsed_text(label)).filter(|t| !t.is_empty());
        }
    }

    field
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "label")
        .map(collapsed_text)
        .filter(|t| !t.is_empty())
}
