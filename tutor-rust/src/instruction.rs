use crate::Variant;

/// One fragment of the system instruction, either fixed text or text
/// derived from the context of the request.
#[derive(Debug, Clone)]
pub enum InstructionParam<TCtx> {
    String(String),
    Func(fn(&TCtx) -> String),
}

impl<TCtx> InstructionParam<TCtx> {
    pub fn as_string(&self, context: &TCtx) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Func(f) => f(context),
        }
    }
}

impl<TCtx> From<&str> for InstructionParam<TCtx> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<TCtx> From<String> for InstructionParam<TCtx> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<TCtx> From<fn(&TCtx) -> String> for InstructionParam<TCtx> {
    fn from(value: fn(&TCtx) -> String) -> Self {
        Self::Func(value)
    }
}

pub fn get_prompt<TCtx>(instructions: &[InstructionParam<TCtx>], context: &TCtx) -> String {
    instructions
        .iter()
        .map(|param| param.as_string(context))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn tutor_role(variant: &Variant) -> String {
    format!(
        "You are an expert {variant} tutor. Your mission is to provide comprehensive, in-depth, \
         and easy-to-follow step-by-step tutorials."
    )
}

fn application_guidance(variant: &Variant) -> String {
    format!("**Application-Specific Guidance:** {}", variant.guidance())
}

const RESPONSE_RULES: &str = "The user will ask how to do something. You MUST respond with a \
     tutorial in the requested JSON format. Each step should be highly detailed, actionable, and \
     precise. Explain not just *what* to do, but also *why* it's done. Include specific menu \
     paths (e.g., 'File > Open'), tool names, and common keyboard shortcuts (e.g., Ctrl+C / \
     Cmd+C). Assume the user has the application open but is a beginner who appreciates \
     thorough explanations. Give the tutorial a short, relevant title. Crucially, do NOT include \
     the step number (e.g., \"Step 1:\") in the step description string itself; the user \
     interface will add that automatically.";

/// The instruction fragments every tutorial request starts from.
#[must_use]
pub fn default_instructions() -> Vec<InstructionParam<Variant>> {
    vec![
        InstructionParam::Func(tutor_role),
        InstructionParam::Func(application_guidance),
        InstructionParam::String(RESPONSE_RULES.to_string()),
    ]
}

/// The user turn for a question.
#[must_use]
pub fn user_request(prompt: &str) -> String {
    format!("Generate a tutorial for: \"{prompt}\"")
}
