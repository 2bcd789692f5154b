use serde_json::Value;

use crate::{model::ModelDescriptor, widgets::escape};

/// Render the image classifier panel with the model name and its labels.
pub fn render(model: &ModelDescriptor) -> String {
    let name = model
        .extra
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Image classifier");
    let labels: Vec<&str> = model
        .output
        .payload
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| labels.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut html = match model.extra.get("model_id").and_then(Value::as_str) {
        Some(model_id) => format!(
            r#"<section class="widget image-classifier" data-model-id="{}">"#,
            escape(model_id)
        ),
        None => String::from(r#"<section class="widget image-classifier">"#),
    };
    html.push_str(&format!("<h2>{}</h2>", escape(name)));

    if !labels.is_empty() {
        html.push_str("<ul class=\"labels\">");
        for label in labels {
            html.push_str(&format!("<li>{}</li>", escape(label)));
        }
        html.push_str("</ul>");
    }

    html.push_str("</section>");
    html
}
