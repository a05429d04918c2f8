use super::*;
use serde_json::json;

#[test]
fn request_requires_an_image_data_url() {
    assert!(SuggestionRequest::new("data:image/png;base64,AAAA").is_ok());
    assert!(SuggestionRequest::new("https://example.com/cat.png").is_err());
    assert!(SuggestionRequest::new("data:text/plain,hi").is_err());
}

#[test]
fn strips_numbering_and_truncates_to_three() {
    let raw = "1. Golden Hour\n2) Chase The Light\n- Wander Often\n4. Too Many";
    assert_eq!(
        parse_suggestions(raw),
        vec!["Golden Hour", "Chase The Light", "Wander Often"]
    );
}

#[test]
fn drops_blank_lines_and_keeps_plain_ones() {
    let raw = "\nMountain Calling\n\n  \nInto The Wild\n";
    assert_eq!(
        parse_suggestions(raw),
        vec!["Mountain Calling", "Into The Wild"]
    );
}

#[test]
fn double_digit_numbering_is_stripped_too() {
    assert_eq!(parse_suggestions("12. Dream Big"), vec!["Dream Big"]);
}

#[test]
fn extracts_content_from_the_chat_response_shape() {
    let body = json!({
        "choices": [ { "message": { "content": "Sea Breeze\nSalt & Sun" } } ]
    });
    assert_eq!(
        parse_suggestion_response(&body).unwrap(),
        "Sea Breeze\nSalt & Sun"
    );
}

#[test]
fn missing_or_non_string_content_is_a_hard_error() {
    for body in [
        json!({}),
        json!({ "choices": [] }),
        json!({ "choices": [ { "message": {} } ] }),
        json!({ "choices": [ { "message": { "content": 7 } } ] }),
    ] {
        assert!(matches!(
            parse_suggestion_response(&body),
            Err(UnderlayError::Upstream { .. })
        ));
    }
}
