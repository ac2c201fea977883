//! Wire types for the image-generation responses endpoint

use serde::{Deserialize, Serialize};

/// Conversation role, shared by the transcript and the wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the request `input` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTurn {
    pub role: Role,
    pub content: Vec<ContentItem>,
}

/// Content item of a request turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Text written by the user
    InputText { text: String },
    /// Text previously produced by the assistant
    OutputText { text: String },
    /// Image passed as a `data:` URI
    InputImage { image_url: String },
}

impl ContentItem {
    /// Text item tagged for the role that produced it
    pub fn text_for(role: Role, text: impl Into<String>) -> Self {
        let text = text.into();
        match role {
            Role::User => ContentItem::InputText { text },
            Role::Assistant => ContentItem::OutputText { text },
        }
    }
}

/// Tool declaration sent with every request
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub r#type: &'static str,
}

impl ToolSpec {
    pub const IMAGE_GENERATION: ToolSpec = ToolSpec {
        r#type: "image_generation",
    };
}

/// Full request body
#[derive(Debug, Serialize)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub input: &'a [RequestTurn],
    pub tools: Vec<ToolSpec>,
}

/// Response body; only the output array is consumed
#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// One item of the response `output` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<MessageContent>,
    },
    ImageGenerationCall {
        #[serde(default)]
        result: Option<String>,
    },
    /// Reasoning, web search and any kind added later
    #[serde(other)]
    Unknown,
}

impl OutputItem {
    /// Message item carrying the given text pieces
    #[cfg(test)]
    pub fn message<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OutputItem::Message {
            content: texts
                .into_iter()
                .map(|t| MessageContent {
                    text: Some(t.into()),
                })
                .collect(),
        }
    }

    /// Image generation item with a base64 result
    #[cfg(test)]
    pub fn image(result: impl Into<String>) -> Self {
        OutputItem::ImageGenerationCall {
            result: Some(result.into()),
        }
    }
}

/// Content piece of a message output item
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_to_wire_shape() {
        let turns = vec![
            RequestTurn {
                role: Role::User,
                content: vec![ContentItem::text_for(Role::User, "make it blue")],
            },
            RequestTurn {
                role: Role::Assistant,
                content: vec![ContentItem::text_for(Role::Assistant, "Done!")],
            },
            RequestTurn {
                role: Role::User,
                content: vec![
                    ContentItem::InputText {
                        text: "now red".to_string(),
                    },
                    ContentItem::InputImage {
                        image_url: "data:image/png;base64,AAAA".to_string(),
                    },
                ],
            },
        ];
        let request = ResponsesRequest {
            model: "gpt-4o",
            input: &turns,
            tools: vec![ToolSpec::IMAGE_GENERATION],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o",
                "input": [
                    {"role": "user", "content": [{"type": "input_text", "text": "make it blue"}]},
                    {"role": "assistant", "content": [{"type": "output_text", "text": "Done!"}]},
                    {"role": "user", "content": [
                        {"type": "input_text", "text": "now red"},
                        {"type": "input_image", "image_url": "data:image/png;base64,AAAA"}
                    ]}
                ],
                "tools": [{"type": "image_generation"}]
            })
        );
    }

    #[test]
    fn test_output_items_parse() {
        let body = json!({
            "id": "resp_1",
            "status": "completed",
            "output": [
                {"type": "reasoning", "id": "rs_1", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "Done!", "annotations": []},
                    {"type": "refusal", "refusal": "nope"}
                ]},
                {"type": "image_generation_call", "id": "ig_1", "status": "completed", "result": "QUJD"}
            ]
        });

        let parsed: ResponsesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            parsed.output,
            vec![
                OutputItem::Unknown,
                OutputItem::Message {
                    content: vec![
                        MessageContent {
                            text: Some("Done!".to_string())
                        },
                        MessageContent { text: None },
                    ]
                },
                OutputItem::image("QUJD"),
            ]
        );
    }

    #[test]
    fn test_missing_output_is_empty() {
        let parsed: ResponsesResponse = serde_json::from_value(json!({"id": "resp_2"})).unwrap();
        assert!(parsed.output.is_empty());
    }

    #[test]
    fn test_image_call_without_result() {
        let parsed: OutputItem =
            serde_json::from_value(json!({"type": "image_generation_call", "status": "failed"}))
                .unwrap();
        assert_eq!(parsed, OutputItem::ImageGenerationCall { result: None });
    }
}
