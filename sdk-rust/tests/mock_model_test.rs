use tutor_sdk::{
    mock::{MockGenerateResult, MockLanguageModel},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelResponse, Part,
};

fn user_input(text: &str) -> LanguageModelInput {
    LanguageModelInput {
        messages: vec![Message::user(vec![Part::text(text)])],
        ..LanguageModelInput::default()
    }
}

#[tokio::test]
async fn mock_language_model_tracks_generate_inputs_and_returns_results() {
    let model = MockLanguageModel::new();

    let first = ModelResponse::text("Hello, world!");
    let third = ModelResponse::text("Goodbye, world!");

    model
        .enqueue_generate(first.clone())
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::InvalidInput(
            "generate error".to_string(),
        )))
        .enqueue_generate(third.clone());

    let res1 = model
        .generate(user_input("Hi"))
        .await
        .expect("first generate should succeed");
    assert_eq!(res1, first);

    let err = model
        .generate(user_input("Error"))
        .await
        .expect_err("second generate should fail");
    assert!(matches!(err, LanguageModelError::InvalidInput(ref msg) if msg == "generate error"));

    let res3 = model
        .generate(user_input("Bye"))
        .await
        .expect("third generate should succeed");
    assert_eq!(res3, third);

    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 3);
    assert_eq!(tracked[0], user_input("Hi"));
    assert_eq!(tracked[2], user_input("Bye"));
}

#[tokio::test]
async fn mock_language_model_errors_when_queue_is_empty() {
    let model = MockLanguageModel::new();

    let err = model
        .generate(user_input("Hi"))
        .await
        .expect_err("generate without enqueued results should fail");

    assert!(matches!(err, LanguageModelError::Invariant("mock", _)));
    assert_eq!(model.generate_calls(), 1);
}

#[tokio::test]
async fn mock_language_model_restore_clears_queue_and_inputs() {
    let model = MockLanguageModel::new();
    model.enqueue_generate(ModelResponse::text("unused"));
    model.restore();

    assert!(model.generate(user_input("Hi")).await.is_err());
    model.restore();
    assert!(model.tracked_generate_inputs().is_empty());
}
