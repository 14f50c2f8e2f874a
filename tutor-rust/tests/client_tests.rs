use std::{sync::Arc, time::Duration};
use tutor_sdk::{
    mock::MockLanguageModel, LanguageModel, LanguageModelError, LanguageModelInput,
    LanguageModelResult, Message, ModelResponse, Part, ResponseFormatOption,
};
use video_tutor::{GenerationError, TutorialClient, Variant};

fn reply(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![Part::text(text)],
        ..Default::default()
    }
}

#[tokio::test]
async fn generate_sends_instructions_prompt_and_schema() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(reply(
        r#"{"title":"Cinematic Color Grading","steps":["Open the Color page...","Add a node..."]}"#,
    ));

    let client = TutorialClient::builder(model.clone())
        .temperature(0.4)
        .build();
    let tutorial = client
        .generate("How to color grade a cinematic video?", Variant::DavinciResolve)
        .await
        .expect("generate succeeds");

    assert_eq!(tutorial.title(), "Cinematic Color Grading");
    assert_eq!(tutorial.steps(), ["Open the Color page...", "Add a node..."]);

    let inputs = model.tracked_generate_inputs();
    assert_eq!(inputs.len(), 1);
    let input = &inputs[0];

    let system_prompt = input.system_prompt.as_deref().expect("system prompt");
    assert!(system_prompt.contains("You are an expert Davinci Resolve tutor."));
    assert!(system_prompt.contains(Variant::DavinciResolve.guidance()));
    assert!(!system_prompt.contains(Variant::FinalCutPro.guidance()));

    assert_eq!(
        input.messages,
        vec![Message::user(vec![Part::text(
            "Generate a tutorial for: \"How to color grade a cinematic video?\""
        )])]
    );
    assert_eq!(input.temperature, Some(0.4));

    let Some(ResponseFormatOption::Json(format)) = &input.response_format else {
        panic!("expected a JSON response format");
    };
    assert_eq!(format.schema, Some(video_tutor::tutorial_schema()));
}

#[tokio::test]
async fn generate_strips_step_numbers_from_the_reply() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(reply(
        r#"{"title":"Montage","steps":["Step 1: Import clips","step 2:Add music","STEP 3 : Render"]}"#,
    ));

    let tutorial = TutorialClient::builder(model)
        .build()
        .generate("How to create a video montage with music?", Variant::SonyVegas)
        .await
        .expect("generate succeeds");

    assert_eq!(tutorial.steps(), ["Import clips", "Add music", "Render"]);
    for step in tutorial.steps() {
        assert!(!step.to_lowercase().starts_with("step"));
    }
}

#[tokio::test]
async fn generate_fails_closed_on_replies_that_do_not_match_the_schema() {
    let cases = [
        ("", "empty"),
        ("   ", "empty"),
        ("not json", "malformed"),
        (r#"["a","b"]"#, "schema"),
        (r#"{"steps":["a"]}"#, "schema"),
        (r#"{"title":"","steps":["a"]}"#, "schema"),
        (r#"{"title":"T"}"#, "schema"),
        (r#"{"title":"T","steps":"a"}"#, "schema"),
        (r#"{"title":"T","steps":[]}"#, "schema"),
        (r#"{"title":"T","steps":["a",3]}"#, "schema"),
        (r#"{"title":"T","steps":["a","Step 2:"]}"#, "schema"),
    ];

    for (text, expected) in cases {
        let model = Arc::new(MockLanguageModel::new());
        model.enqueue_generate(reply(text));

        let err = TutorialClient::builder(model)
            .build()
            .generate("Create a multicam clip", Variant::FinalCutPro)
            .await
            .expect_err("reply must be rejected");

        let matched = match expected {
            "empty" => matches!(err, GenerationError::EmptyReply),
            "malformed" => matches!(err, GenerationError::MalformedReply(_)),
            _ => matches!(err, GenerationError::SchemaMismatch(_)),
        };
        assert!(matched, "reply {text:?} produced {err:?}");
        assert_eq!(
            err.user_message(),
            "Sorry, I couldn't generate a tutorial. Please try again."
        );
    }
}

#[tokio::test]
async fn generate_surfaces_model_errors() {
    let model = Arc::new(MockLanguageModel::new());
    model.enqueue_generate(LanguageModelError::Refusal("blocked".to_string()));

    let err = TutorialClient::builder(model.clone())
        .build()
        .generate("Create a multicam clip", Variant::FinalCutPro)
        .await
        .expect_err("model error is surfaced");

    assert!(matches!(
        err,
        GenerationError::Model(LanguageModelError::Refusal(_))
    ));
    assert_eq!(model.generate_calls(), 1);
}

struct HangingModel;

#[async_trait::async_trait]
impl LanguageModel for HangingModel {
    fn provider(&self) -> &'static str {
        "hanging"
    }

    fn model_id(&self) -> String {
        "hanging-model".to_string()
    }

    async fn generate(&self, _input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn generate_times_out_when_a_timeout_is_configured() {
    let client = TutorialClient::builder(Arc::new(HangingModel))
        .timeout(Duration::from_millis(20))
        .build();

    let err = client
        .generate("Create a multicam clip", Variant::FinalCutPro)
        .await
        .expect_err("call times out");

    assert!(matches!(err, GenerationError::Timeout(d) if d == Duration::from_millis(20)));
}
