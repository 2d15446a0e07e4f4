// All LLM prompt constants for the correction oracle.

/// System prompt — constrains the model to plain corrected text.
pub const CORRECTION_SYSTEM: &str = "You are a professional proofreader. \
    You correct spelling, grammar, and punctuation errors ONLY. \
    You MUST respond with the corrected text and nothing else. \
    Do NOT use markdown code fences. \
    Do NOT include explanations, comments, or apologies.";

/// Per-unit correction prompt template.
/// Replace: {protected_terms}, {uppercase_tokens}, {text}
pub const CORRECTION_PROMPT_TEMPLATE: &str = r#"Correct ONLY spelling, grammar, and punctuation errors in the text below.

HARD RULES:
1. Do NOT change the meaning or content of the text
2. Do NOT add or remove information
3. Do NOT alter proper names, URLs, emails, or technical terms
4. Keep EXACTLY the same structure as the original text
5. Fix ONLY spelling, grammar, and punctuation errors
6. Return ONLY the corrected text, without comments or explanations
7. If there are no errors, return the text exactly as it is
8. PRESERVE upper and lower case exactly as in the original text
9. Keep every ALL-UPPERCASE word exactly as it appears in the original

TERMS THAT MUST BE PRESERVED EXACTLY AS WRITTEN (never alter them):
{protected_terms}

UPPERCASE WORDS THAT MUST STAY UPPERCASE:
{uppercase_tokens}

TEXT TO CORRECT:
{text}

CORRECTED TEXT:"#;

/// Builds the per-unit prompt. The unit text is substituted last so braces
/// inside it are never treated as placeholders.
pub fn build_correction_prompt(
    text: &str,
    protected_terms: &[String],
    uppercase_tokens: &[String],
) -> String {
    let terms = protected_terms
        .iter()
        .map(|term| format!("- {term}"))
        .collect::<Vec<_>>()
        .join("\n");

    CORRECTION_PROMPT_TEMPLATE
        .replace("{protected_terms}", &terms)
        .replace("{uppercase_tokens}", &uppercase_tokens.join(", "))
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_protected_terms() {
        let prompt = build_correction_prompt(
            "Bem vindo à APONTE",
            &["APONTE".to_string(), "Aponte".to_string()],
            &["APONTE".to_string()],
        );
        assert!(prompt.contains("- APONTE"));
        assert!(prompt.contains("- Aponte"));
        assert!(prompt.contains("Bem vindo à APONTE"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn test_prompt_joins_uppercase_tokens() {
        let prompt = build_correction_prompt(
            "RH e TI",
            &[],
            &["RH".to_string(), "TI".to_string()],
        );
        assert!(prompt.contains("RH, TI"));
    }

    #[test]
    fn test_braces_in_unit_text_are_not_expanded() {
        let prompt = build_correction_prompt("veja {uppercase_tokens} aqui", &[], &[]);
        assert!(prompt.contains("veja {uppercase_tokens} aqui"));
    }
}
