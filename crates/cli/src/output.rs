use ferrous_lookup_application::use_cases::LookupOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonQuestion {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    class: String,
}

#[derive(Debug, Serialize)]
struct JsonFlags {
    authoritative: bool,
    truncated: bool,
    recursion_desired: bool,
    recursion_available: bool,
    authentic_data: bool,
    checking_disabled: bool,
}

#[derive(Debug, Serialize)]
struct JsonResult {
    server: String,
    protocol: &'static str,
    elapsed_ms: u64,
    id: u16,
    rcode: String,
    flags: JsonFlags,
    question: JsonQuestion,
    answers: Vec<String>,
    authority: Vec<String>,
    additional: Vec<String>,
}

fn records<R: ToString>(records: &[R]) -> Vec<String> {
    records.iter().map(|r| r.to_string()).collect()
}

pub fn render_text(outcome: &LookupOutcome) -> String {
    format!(
        "Server: {}\n\nferrous-lookup result (elapsed {:?}):\n{}\n",
        outcome.server, outcome.elapsed, outcome.message
    )
}

pub fn render_json(outcome: &LookupOutcome) -> anyhow::Result<String> {
    let message = &outcome.message;
    let question = &outcome.query.question;
    let result = JsonResult {
        server: outcome.server.to_string(),
        protocol: outcome.server.protocol.protocol_name(),
        elapsed_ms: outcome.elapsed.as_millis() as u64,
        id: outcome.query.id,
        rcode: format!("{:?}", message.response_code()),
        flags: JsonFlags {
            authoritative: message.authoritative(),
            truncated: message.truncated(),
            recursion_desired: message.recursion_desired(),
            recursion_available: message.recursion_available(),
            authentic_data: message.authentic_data(),
            checking_disabled: message.checking_disabled(),
        },
        question: JsonQuestion {
            name: question.name.to_string(),
            record_type: question.record_type.to_string(),
            class: question.class.to_string(),
        },
        answers: records(message.answers()),
        authority: records(message.name_servers()),
        additional: records(message.additionals()),
    };

    Ok(serde_json::to_string_pretty(&result)?)
}
