//! Fixed instruction text and response schema sent with every generation request.

use serde_json::{json, Value};

/// Domain rules the model has to follow. The crate never computes ladder logic itself.
pub const SYSTEM_INSTRUCTION: &str = r#"You are an expert M221 PLC Programmer. Generate logic strictly following Schneider Electric .smbp XML standards.

CRITICAL RULES:
1. Every logic segment must be a 'Rung'.
2. Rungs must contain both 'LadderElements' (for visual grid) and 'InstructionLines' (for IL code).
3. Grid is 11 columns (0-10). Coils MUST be at column 10.
4. Use ElementTypes: NormalContact, NegatedContact, Coil, Line, Timer.
5. Connection types: 'Left, Right', 'Left', 'Down, Left, Right', 'Up, Left', 'None'.
6. Always include a 'System Ready' rung (Pattern 1) as the first rung.
7. Use addressing like %I0.0, %Q0.0, %M0, %TM0.

Output must be a JSON that can be transformed into a valid .smbp XML."#;

/// Response schema in the Gemini `responseSchema` dialect (OpenAPI subset, upper-case types).
pub fn response_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    let variable = json!({
        "type": "OBJECT",
        "properties": {
            "id": string,
            "address": string,
            "symbol": string,
            "type": string,
            "comment": string
        },
        "required": ["address", "symbol", "type"]
    });

    let element = json!({
        "type": "OBJECT",
        "properties": {
            "type": {
                "type": "STRING",
                "enum": ["NormalContact", "NegatedContact", "Coil", "Line", "Timer"]
            },
            "descriptor": string,
            "symbol": string,
            "row": { "type": "INTEGER" },
            "column": { "type": "INTEGER" },
            "connection": {
                "type": "STRING",
                "enum": ["Left, Right", "Left", "Down, Left, Right", "Up, Left", "None"]
            }
        },
        "required": ["type", "row", "column", "connection"]
    });

    let rung = json!({
        "type": "OBJECT",
        "properties": {
            "name": string,
            "comment": string,
            "elements": { "type": "ARRAY", "items": element },
            "instructionLines": string_list
        },
        "required": ["name", "elements", "instructionLines"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "description": string,
            "variables": { "type": "ARRAY", "items": variable },
            "rungs": { "type": "ARRAY", "items": rung },
            "instructionList": string,
            "ladderLogicSteps": string_list
        },
        "required": ["description", "variables", "rungs", "instructionList", "ladderLogicSteps"]
    })
}
