#![allow(dead_code)]

use ecologic::{GeminiClient, GeminiConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_MODEL: &str = "gemini-test";
pub const TEST_KEY: &str = "test-key";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

/// The example from the product brief: one memory bit, one rung with a coil.
pub fn example_logic() -> Value {
    json!({
        "description": "Latch the start bit",
        "variables": [
            {"id": "1", "address": "%M0", "symbol": "Start", "type": "BOOL", "comment": "start bit"}
        ],
        "rungs": [
            {
                "name": "R1",
                "comment": "init",
                "elements": [
                    {"type": "Coil", "descriptor": "Start", "symbol": "", "row": 0, "column": 10, "connection": "Left"}
                ],
                "instructionLines": ["LD %I0.0", "ST %M0"]
            }
        ],
        "instructionList": "LD %I0.0\nST %M0",
        "ladderLogicSteps": ["Read %I0.0", "Store in %M0"]
    })
}

/// Wraps `text` the way `generateContent` returns it.
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [
            {
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }
        ]
    })
}

pub fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_url: server.uri(),
        api_key: TEST_KEY.to_string(),
        model: TEST_MODEL.to_string(),
    })
}
