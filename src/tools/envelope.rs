use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Image {
        data: Vec<u8>,
        mime_type: &'static str,
    },
}

impl Part {
    fn to_value(&self) -> Value {
        match self {
            Part::Text(text) => json!({"type": "text", "text": text}),
            Part::Image { data, mime_type } => json!({
                "type": "image",
                "data": STANDARD.encode(data),
                "mimeType": mime_type
            }),
        }
    }
}

/// Successful multi-part tool result: one leading summary followed by the
/// per-page parts in page order.
#[derive(Debug, Clone)]
pub struct ResultEnvelope {
    parts: Vec<Part>,
    structured: Value,
}

impl ResultEnvelope {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(summary.into())],
            structured: json!({}),
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.parts.push(Part::Text(text.into()));
    }

    pub fn push_image(&mut self, data: Vec<u8>, mime_type: &'static str) {
        self.parts.push(Part::Image { data, mime_type });
    }

    pub fn with_structured(mut self, structured: Value) -> Self {
        self.structured = structured;
        self
    }

    #[cfg(test)]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, Part::Image { .. }))
            .count()
    }

    pub fn into_result(self) -> Value {
        let content: Vec<Value> = self.parts.iter().map(Part::to_value).collect();
        json!({
            "content": content,
            "structuredContent": self.structured,
            "isError": false
        })
    }
}
