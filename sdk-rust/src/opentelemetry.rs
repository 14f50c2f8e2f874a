use crate::{LanguageModelInput, LanguageModelResult, ModelResponse, ResponseFormatOption};
use opentelemetry::trace::Status;
use std::{future::Future, time::Instant};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span covering one `generate` call. Request attributes follow the
/// `gen_ai.*` semantic conventions and are set when the call starts; usage,
/// duration and status are set when it settles.
struct GenerateSpan {
    span: Span,
    started: Instant,
}

impl GenerateSpan {
    fn start(provider: &str, model_id: &str, input: &LanguageModelInput) -> Self {
        let span = info_span!("tutor_sdk.generate", provider, model_id);
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());

        let output_type = match input.response_format {
            Some(ResponseFormatOption::Json(_)) => "json",
            _ => "text",
        };
        span.set_attribute("gen_ai.output.type", output_type);

        if let Some(max_tokens) = input.max_tokens {
            span.set_attribute("gen_ai.request.max_tokens", i64::from(max_tokens));
        }
        if let Some(temperature) = input.temperature {
            span.set_attribute("gen_ai.request.temperature", temperature);
        }
        if let Some(top_p) = input.top_p {
            span.set_attribute("gen_ai.request.top_p", top_p);
        }
        if let Some(top_k) = input.top_k {
            span.set_attribute("gen_ai.request.top_k", i64::from(top_k));
        }
        if let Some(seed) = input.seed {
            span.set_attribute("gen_ai.request.seed", seed);
        }

        Self {
            span,
            started: Instant::now(),
        }
    }

    fn finish(self, result: &LanguageModelResult<ModelResponse>) {
        match result {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    self.span
                        .set_attribute("gen_ai.usage.input_tokens", i64::from(usage.input_tokens));
                    self.span.set_attribute(
                        "gen_ai.usage.output_tokens",
                        i64::from(usage.output_tokens),
                    );
                }
            }
            Err(error) => {
                self.span.set_attribute("exception.message", error.to_string());
                self.span.set_status(Status::error(error.to_string()));
            }
        }
        self.span.set_attribute(
            "tutor_sdk.duration_seconds",
            self.started.elapsed().as_secs_f64(),
        );
    }
}

/// Run a provider call inside a `tutor_sdk.generate` span.
pub async fn trace_generate<F, Fut>(
    provider: &str,
    model_id: &str,
    input: LanguageModelInput,
    f: F,
) -> LanguageModelResult<ModelResponse>
where
    F: FnOnce(LanguageModelInput) -> Fut,
    Fut: Future<Output = LanguageModelResult<ModelResponse>>,
{
    let span = GenerateSpan::start(provider, model_id, &input);
    let result = f(input).instrument(span.span.clone()).await;
    span.finish(&result);
    result
}
