//! Prompt construction for character transformations.
//!
//! Prompts are plain text and fully determined by the character's styling
//! metadata, so the same character always yields the same prompt.

/// Used when a character has no costume description.
pub const DEFAULT_COSTUME_DESCRIPTION: &str = "characteristic costume and accessories";

/// Used when a character has no prompt template.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Transform the person to match the anime character style";

/// Appended to the enhanced prompt of the second, text-only attempt.
pub const IMAGE_GENERATION_REQUEST: &str =
    "Generate an anime-style image based on this description.";

/// Character fields that feed the prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptCharacter<'a> {
    pub name: &'a str,
    pub series: &'a str,
    pub costume_description: Option<&'a str>,
    pub prompt_template: Option<&'a str>,
}

/// Build the instruction sent alongside the uploaded photo.
///
/// Blank optional fields fall back to the generic defaults.
pub fn build_transformation_prompt(character: &PromptCharacter<'_>) -> String {
    let name = character.name;
    let series = character.series;
    let costume = non_blank(character.costume_description).unwrap_or(DEFAULT_COSTUME_DESCRIPTION);
    let template = non_blank(character.prompt_template).unwrap_or(DEFAULT_PROMPT_TEMPLATE);

    format!(
        "Transform this uploaded photo of a person into a high-quality anime-style illustration \
where the person is transformed into {name} from {series}.

Requirements:
- Apply anime art style with clean lines and vibrant colors
- Transform the person to look like {name} while maintaining basic facial structure
- Include {costume}
- Apply the characteristic features and styling of {name}
- Background should complement the {series} anime aesthetic
- High resolution output suitable for download and sharing
- Style should match the art direction of {series}

Character-specific transformation: {template}

Make the transformation look natural and professionally done, as if it's official anime artwork."
    )
}

/// Build the text-only prompt for the second attempt.
///
/// The model's commentary from the first attempt, when present, is appended
/// as additional detail before the explicit image-generation request.
pub fn build_enhanced_prompt(base_prompt: &str, commentary: Option<&str>) -> String {
    let mut prompt = base_prompt.to_string();
    if let Some(text) = non_blank(commentary) {
        prompt.push_str("\n\nAdditional details: ");
        prompt.push_str(text);
    }
    prompt.push_str("\n\n");
    prompt.push_str(IMAGE_GENERATION_REQUEST);
    prompt
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
