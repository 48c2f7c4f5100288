//! Integration tests for POST /api/ai/orchestrate
//!
//! The language model is a scripted double keyed on system-prompt content,
//! so concurrent calls get deterministic answers.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use xiaoyu_ai::llm::LlmError;

use helpers::{create_test_app, post_json, post_raw, post_text, send, ScriptedModel};

const URI: &str = "/api/ai/orchestrate";

#[tokio::test]
async fn test_simple_message_makes_one_call() {
    let model = Arc::new(ScriptedModel::new("注意插座防护"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(app, post_json(URI, &json!({ "message": "孩子的安全" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complexity"], "simple");
    assert_eq!(json["mainRole"], "guardian");
    assert_eq!(json["mainResponse"], "注意插座防护");
    assert_eq!(json["roleName"], "守护者");
    assert_eq!(json["roleIcon"], "ri-shield-line");
    assert!(json.get("supportingInsights").is_none());
    assert!(json.get("suggestedActions").is_none());
    assert!(json.get("emotion").is_none());

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system.contains("\"守护者\"角色"));
    assert_eq!(calls[0].prompt, "孩子的安全");
}

#[tokio::test]
async fn test_unmatched_message_goes_to_advisor() {
    let model = Arc::new(ScriptedModel::new("你好呀"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(app, post_json(URI, &json!({ "message": "嗯" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complexity"], "simple");
    assert_eq!(json["mainRole"], "advisor");
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_greeting_goes_to_advisor_verbatim() {
    let model = Arc::new(ScriptedModel::new("你好！有什么育儿问题我可以帮你？"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(app, post_json(URI, &json!({ "message": "你好" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complexity"], "simple");
    assert_eq!(json["mainRole"], "advisor");
    assert_eq!(json["mainResponse"], "你好！有什么育儿问题我可以帮你？");
    assert!(json.get("supportingInsights").is_none());

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "你好");
}

#[tokio::test]
async fn test_text_plain_body_is_accepted() {
    let model = Arc::new(ScriptedModel::new("注意插座防护"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(app, post_text(URI, r#"{"message":"孩子的安全"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mainRole"], "guardian");
    assert_eq!(json["mainResponse"], "注意插座防护");
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_medium_message_adds_support_insight() {
    let model = Arc::new(
        ScriptedModel::new("主要回答").respond_when("基于\"守护者\"的视角", "检查家中尖角"),
    );
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(app, post_json(URI, &json!({ "message": "关于安全有什么建议" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complexity"], "medium");
    assert_eq!(json["mainRole"], "advisor");
    assert_eq!(json["mainResponse"], "主要回答");
    assert_eq!(json["supportingInsights"].as_array().unwrap().len(), 1);
    assert_eq!(json["supportingInsights"][0]["role"], "guardian");
    assert_eq!(json["supportingInsights"][0]["roleName"], "守护者");
    assert_eq!(json["supportingInsights"][0]["insight"], "检查家中尖角");
    assert!(json.get("suggestedActions").is_none());
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn test_complex_message_runs_full_pipeline() {
    let model = Arc::new(
        ScriptedModel::new("未预期")
            .respond_when("需要综合多个角色视角", "综合分析")
            .respond_when("你是\"聆听者\"", "倾听孩子")
            .respond_when("你是\"建议者\"", "制定规则")
            .respond_when("你是\"守护者\"", "远离危险")
            .respond_when("行动建议", " 多陪伴 |讲故事|| 早点睡 "),
    );
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(
        app,
        post_json(URI, &json!({ "message": "孩子心情不好还做危险的事怎么办" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complexity"], "complex");
    assert_eq!(json["mainRole"], "companion");
    assert_eq!(json["mainResponse"], "综合分析");
    assert_eq!(json["suggestedActions"], json!(["多陪伴", "讲故事", "早点睡"]));

    let insights: Vec<(&str, &str)> = json["supportingInsights"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| (i["role"].as_str().unwrap(), i["insight"].as_str().unwrap()))
        .collect();
    assert_eq!(
        insights,
        vec![
            ("listener", "倾听孩子"),
            ("advisor", "制定规则"),
            ("guardian", "远离危险")
        ]
    );

    let involved: Vec<&str> = json["involvedRoles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(involved, vec!["companion", "listener", "advisor", "guardian"]);

    let calls = model.calls();
    assert_eq!(calls.len(), 5);
    let actions_call = calls
        .iter()
        .find(|c| c.system.contains("行动建议"))
        .unwrap();
    assert!(actions_call.prompt.starts_with("问题：孩子心情不好还做危险的事怎么办"));
    assert!(actions_call.prompt.ends_with("分析：综合分析"));
}

#[tokio::test]
async fn test_voice_emotion_is_fused_and_returned() {
    let model = Arc::new(ScriptedModel::new("好的"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(
        app,
        post_json(
            URI,
            &json!({
                "message": "孩子的安全",
                "voiceEmotion": { "type": "sad", "confidence": 0.8, "pitch": 180, "energy": 0.2 }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["emotion"]["dominantEmotion"].is_string());
    assert!(json["emotion"]["recommendation"].is_string());
    assert_eq!(json["emotion"]["sources"]["voice"]["type"], "sad");

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system.contains("情绪参考：孩子当前情绪为"));
}

#[tokio::test]
async fn test_voice_emotion_accepts_infant_vocabulary() {
    let model = Arc::new(ScriptedModel::new("好的"));
    let app = create_test_app(Some(model), false);

    let (status, json) = send(
        app,
        post_json(
            URI,
            &json!({
                "message": "嗯",
                "voiceEmotion": { "type": "Happiness", "confidence": 0.9 }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emotion"]["sources"]["voice"]["type"], "happy");
}

#[tokio::test]
async fn test_child_context_reaches_prompt() {
    let model = Arc::new(ScriptedModel::new("好的"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, _) = send(
        app,
        post_json(
            URI,
            &json!({
                "message": "孩子的安全",
                "childContext": { "name": "小语", "ageText": "2岁", "stage": "幼儿期", "traits": ["好动"] }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let calls = model.calls();
    assert!(calls[0].system.contains("- 姓名：小语"));
    assert!(calls[0].system.contains("- 特点：好动"));
}

#[tokio::test]
async fn test_empty_message_is_rejected_before_model_check() {
    let app = create_test_app(None, false);

    for body in [json!({}), json!({ "message": "" }), json!({ "message": "   " })] {
        let (status, json) = send(app.clone(), post_json(URI, &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "消息内容不能为空");
    }
}

#[tokio::test]
async fn test_missing_language_model_is_configuration_error() {
    let app = create_test_app(None, false);

    let (status, json) = send(app, post_json(URI, &json!({ "message": "你好" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "服务配置错误，请检查 API 密钥");
}

#[tokio::test]
async fn test_model_errors_map_to_status() {
    let cases = [
        (
            LlmError::Unauthorized("bad key".into()),
            StatusCode::UNAUTHORIZED,
            "API密钥配置错误，请检查环境变量",
        ),
        (
            LlmError::RateLimited("slow down".into()),
            StatusCode::TOO_MANY_REQUESTS,
            "请求过于频繁，请稍后再试",
        ),
        (
            LlmError::Timeout("took too long".into()),
            StatusCode::REQUEST_TIMEOUT,
            "请求超时，请重试",
        ),
        (
            LlmError::Upstream("boom".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI协同响应失败，请稍后重试",
        ),
    ];

    for (error, expected_status, expected_message) in cases {
        let model = Arc::new(ScriptedModel::failing(error));
        let app = create_test_app(Some(model), false);

        let (status, json) = send(app, post_json(URI, &json!({ "message": "你好" }))).await;

        assert_eq!(status, expected_status);
        assert_eq!(json["error"], expected_message);
        assert!(json.get("details").is_none());
    }
}

#[tokio::test]
async fn test_details_only_in_development() {
    let model = Arc::new(ScriptedModel::failing(LlmError::Upstream("boom".into())));
    let app = create_test_app(Some(model), true);

    let (status, json) = send(app, post_json(URI, &json!({ "message": "你好" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["details"], "Upstream error: boom");
}

#[tokio::test]
async fn test_failed_insight_fails_whole_request() {
    let model = Arc::new(
        ScriptedModel::new("好的").fail_when("你是\"建议者\"", LlmError::Timeout("slow".into())),
    );
    let app = create_test_app(Some(model), false);

    let (status, json) = send(
        app,
        post_json(URI, &json!({ "message": "孩子心情不好还做危险的事怎么办" })),
    )
    .await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json["error"], "请求超时，请重试");
}

#[tokio::test]
async fn test_malformed_body_is_server_error() {
    let model = Arc::new(ScriptedModel::new("好的"));
    let app = create_test_app(Some(model.clone()), false);

    let (status, json) = send(app, post_raw(URI, "{\"message\": 42}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "AI协同响应失败，请稍后重试");
    assert!(model.calls().is_empty());
}
