use std::fmt;

use serde::Serialize;

use crate::{model::ModelDescriptor, widgets};

/// Output types this service knows how to display. Each variant maps to one
/// [`WidgetKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    ImageClassifier,
}

impl OutputType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "IMG_CLASSIFIER" => Some(Self::ImageClassifier),
            _ => None,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::ImageClassifier => "IMG_CLASSIFIER",
        }
    }
}

/// Handle to a concrete rendering widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    ImageClassifier,
}

impl WidgetKind {
    pub fn render(self, model: &ModelDescriptor) -> String {
        match self {
            Self::ImageClassifier => widgets::image_classifier::render(model),
        }
    }
}

impl From<OutputType> for WidgetKind {
    fn from(output: OutputType) -> Self {
        match output {
            OutputType::ImageClassifier => WidgetKind::ImageClassifier,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageClassifier => write!(f, "image-classifier"),
        }
    }
}

/// Select the widget for `tag`. Absent, empty and unknown tags select nothing.
pub fn dispatch(tag: Option<&str>) -> Option<WidgetKind> {
    tag.and_then(OutputType::from_tag).map(WidgetKind::from)
}

pub fn dispatch_descriptor(model: &ModelDescriptor) -> Option<WidgetKind> {
    dispatch(model.output_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_classifier_tag_selects_its_widget() {
        assert_eq!(dispatch(Some("IMG_CLASSIFIER")), Some(WidgetKind::ImageClassifier));
    }

    #[test]
    fn unknown_tags_select_nothing() {
        for tag in ["", "UNKNOWN_TYPE", "img_classifier", " IMG_CLASSIFIER", "IMG_CLASSIFIER "] {
            assert_eq!(dispatch(Some(tag)), None, "tag {tag:?}");
        }
        assert_eq!(dispatch(None), None);
    }

    #[test]
    fn tags_round_trip_through_output_type() {
        let output = OutputType::ImageClassifier;
        assert_eq!(OutputType::from_tag(output.tag()), Some(output));
    }
}
