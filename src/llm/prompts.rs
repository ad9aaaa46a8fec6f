use crate::summary::SummarizationMode;

/// Words that show a custom instruction already asks for a summary.
const SUMMARY_WORDS: &[&str] = &["summary", "summarize", "summarise", "overview", "main points"];

/// Words that show a custom instruction already asks for takeaways.
const TAKEAWAY_WORDS: &[&str] = &["takeaway", "key points", "key point"];

const STRUCTURE_DIRECTIVE: &str = "Produce a summary first, then a clearly separated section titled \
\"Key Takeaways\" listing each takeaway as a bullet point.";

/// Build the provider prompt for a summarization mode.
///
/// `customize` uses the instruction verbatim and falls back to the `brief`
/// template when the instruction is missing or blank.
pub fn build_prompt(
    mode: SummarizationMode,
    input_text: &str,
    custom_instruction: Option<&str>,
) -> String {
    match mode {
        SummarizationMode::Brief => brief_prompt(input_text),
        SummarizationMode::Detailed => format!(
            "Provide a detailed, comprehensive summary of the following content.\n\
After completing the summary, clearly separate the \"Key Takeaways\" section with this title \
and provide 3-5 actionable insights as bullet points:\n\
\"{input_text}\""
        ),
        SummarizationMode::BulletPoints => format!(
            "Create a professional, well-organized summary of the following content in markdown \
bullet-point format:\n\
- Use bold headers (e.g., **Section Title**) to organize the summary.\n\
- Separate a section titled \"Key Takeaways\" at the end with actionable insights, one bullet each:\n\
  - Example: **Key Takeaway 1**: [Actionable insight].\n\
Content:\n\
\"{input_text}\""
        ),
        SummarizationMode::Customize => match custom_instruction.map(str::trim) {
            Some(instruction) if !instruction.is_empty() => {
                custom_prompt(instruction, input_text)
            }
            _ => brief_prompt(input_text),
        },
    }
}

fn brief_prompt(input_text: &str) -> String {
    format!(
        "Summarize the following content briefly and concisely. Clearly separate the \
\"Key Takeaways\" section with this title and provide actionable insights as bullet points:\n\
\"{input_text}\""
    )
}

fn custom_prompt(instruction: &str, input_text: &str) -> String {
    if asks_for_structure(instruction) {
        format!("{instruction}\n\"{input_text}\"")
    } else {
        format!("{instruction}\n{STRUCTURE_DIRECTIVE}\n\"{input_text}\"")
    }
}

/// True when the instruction mentions both a summary and takeaways.
fn asks_for_structure(instruction: &str) -> bool {
    let lowered = instruction.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lowered.contains(w));
    mentions(SUMMARY_WORDS) && mentions(TAKEAWAY_WORDS)
}
