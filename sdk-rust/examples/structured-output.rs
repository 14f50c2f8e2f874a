use dotenvy::dotenv;
use serde_json::{json, Value};
use tutor_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel, LanguageModelInput, Message, Part, ResponseFormatJson, ResponseFormatOption,
};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let model = GoogleModel::new(
        "gemini-2.5-flash",
        GoogleModelOptions {
            api_key: std::env::var("GOOGLE_API_KEY")
                .expect("GOOGLE_API_KEY environment variable must be set"),
            ..Default::default()
        },
    );

    let schema = json!({
      "type": "object",
      "properties": {
        "title": {
          "type": "string",
          "description": "A short title for the checklist."
        },
        "items": {
          "type": "array",
          "items": { "type": "string" },
          "description": "The checklist items, in order."
        }
      },
      "required": ["title", "items"]
    });

    let response = model
        .generate(LanguageModelInput {
            system_prompt: Some(
                "You write short, practical checklists for video editors.".to_string(),
            ),
            messages: vec![Message::user(vec![Part::text(
                "What should I check before exporting a wedding film?",
            )])],
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: "checklist".to_string(),
                description: None,
                schema: Some(schema),
            })),
            ..Default::default()
        })
        .await
        .expect("generate failed");

    let checklist: Value =
        serde_json::from_str(&response.output_text()).expect("model returned invalid JSON");

    println!("{checklist:#}");
    println!("usage = {:?}", response.usage);
}
